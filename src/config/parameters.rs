//! Parameter structures with physiological defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::organs::heart::MAX_EKG_LEADS;
use crate::state::DEFAULT_WAVEFORM_CAPACITY;

/// Default parameter file location
const DEFAULT_PARAMETER_PATH: &str = "data/parameters/simulation.json";

/// Top-level parameters container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Harness settings
    pub simulation: SimulationParameters,
    /// Esophagus, stomach and gallbladder settings
    pub digestive: DigestiveParameters,
    /// Bladder settings
    pub renal: RenalParameters,
}

impl Parameters {
    /// Load parameters from the default JSON file, or use defaults
    pub fn load_or_default() -> Self {
        Self::load_from_path(DEFAULT_PARAMETER_PATH)
    }

    /// Load parameters from a specific JSON file, or use defaults.
    ///
    /// Files that parse but fail validation also fall back to defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str::<Parameters>(&contents) {
                Ok(params) => match params.validate() {
                    Ok(()) => {
                        log::info!("Loaded simulation parameters from {:?}", path.as_ref());
                        params
                    }
                    Err(e) => {
                        log::warn!("Rejected simulation parameters: {}, using defaults", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to parse simulation parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Simulation parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Check every parameter against its accepted domain
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.digestive.validate()?;
        self.renal.validate()
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(field, value, "must be positive and finite"))
    }
}

/// Simulation harness parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Number of EKG leads synthesized by the heart (1-12)
    pub ekg_lead_count: usize,
    /// Samples retained per waveform trace
    pub waveform_capacity: usize,
    /// Seed for the noise source; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<()> {
        if self.ekg_lead_count == 0 || self.ekg_lead_count > MAX_EKG_LEADS {
            return Err(SimError::invalid(
                "ekg_lead_count",
                self.ekg_lead_count as f64,
                "must be between 1 and 12",
            ));
        }
        if self.waveform_capacity == 0 {
            return Err(SimError::invalid(
                "waveform_capacity",
                0.0,
                "must hold at least one sample",
            ));
        }
        Ok(())
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            ekg_lead_count: MAX_EKG_LEADS,
            waveform_capacity: DEFAULT_WAVEFORM_CAPACITY,
            rng_seed: None,
        }
    }
}

/// Digestive chain parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestiveParameters {
    /// Esophagus length (cm)
    pub esophagus_length_cm: f64,
    /// Peristaltic bolus speed at unit motility (cm/s)
    pub peristaltic_speed_cm_per_sec: f64,

    /// Stomach capacity (mL)
    pub stomach_capacity_mL: f64,
    /// Time spent Filling before digestion starts (s)
    pub stomach_filling_dwell_sec: f64,
    /// Duration of the Digesting phase (s)
    pub stomach_digesting_duration_sec: f64,
    /// Chyme delivery rate into the intestines while Emptying (mL/s)
    pub stomach_emptying_rate_mL_per_sec: f64,

    /// Gallbladder capacity (mL)
    pub gallbladder_capacity_mL: f64,
    /// Bile release rate while contracting (mL/s)
    pub gallbladder_release_rate_mL_per_sec: f64,
    /// Longest continuous contraction before returning to Storing (s)
    pub gallbladder_max_contraction_sec: f64,
    /// Storing time after which a spontaneous contraction begins (s)
    pub gallbladder_contraction_interval_sec: f64,
}

impl DigestiveParameters {
    pub fn validate(&self) -> Result<()> {
        require_positive("esophagus_length_cm", self.esophagus_length_cm)?;
        require_positive("peristaltic_speed_cm_per_sec", self.peristaltic_speed_cm_per_sec)?;
        require_positive("stomach_capacity_mL", self.stomach_capacity_mL)?;
        require_positive("stomach_filling_dwell_sec", self.stomach_filling_dwell_sec)?;
        require_positive("stomach_digesting_duration_sec", self.stomach_digesting_duration_sec)?;
        require_positive(
            "stomach_emptying_rate_mL_per_sec",
            self.stomach_emptying_rate_mL_per_sec,
        )?;
        require_positive("gallbladder_capacity_mL", self.gallbladder_capacity_mL)?;
        require_positive(
            "gallbladder_release_rate_mL_per_sec",
            self.gallbladder_release_rate_mL_per_sec,
        )?;
        require_positive("gallbladder_max_contraction_sec", self.gallbladder_max_contraction_sec)?;
        require_positive(
            "gallbladder_contraction_interval_sec",
            self.gallbladder_contraction_interval_sec,
        )
    }
}

impl Default for DigestiveParameters {
    fn default() -> Self {
        Self {
            esophagus_length_cm: 25.0,
            peristaltic_speed_cm_per_sec: 3.0,

            stomach_capacity_mL: 1500.0,
            stomach_filling_dwell_sec: 2.0,
            stomach_digesting_duration_sec: 30.0,
            stomach_emptying_rate_mL_per_sec: 0.5,

            gallbladder_capacity_mL: 50.0,
            gallbladder_release_rate_mL_per_sec: 2.0,
            gallbladder_max_contraction_sec: 60.0,
            gallbladder_contraction_interval_sec: 40.0,
        }
    }
}

/// Urinary tract parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenalParameters {
    /// Bladder capacity (mL)
    pub bladder_capacity_mL: f64,
    /// Detrusor pressure that marks the bladder Full (cmH2O)
    pub bladder_full_pressure_cmH2O: f64,
    /// Time spent Full before voiding starts (s)
    pub bladder_full_dwell_sec: f64,
    /// Drain rate while Voiding (mL/s)
    pub bladder_voiding_rate_mL_per_sec: f64,
}

impl RenalParameters {
    pub fn validate(&self) -> Result<()> {
        require_positive("bladder_capacity_mL", self.bladder_capacity_mL)?;
        require_positive("bladder_full_pressure_cmH2O", self.bladder_full_pressure_cmH2O)?;
        require_positive("bladder_full_dwell_sec", self.bladder_full_dwell_sec)?;
        require_positive(
            "bladder_voiding_rate_mL_per_sec",
            self.bladder_voiding_rate_mL_per_sec,
        )
    }
}

impl Default for RenalParameters {
    fn default() -> Self {
        Self {
            bladder_capacity_mL: 500.0,
            bladder_full_pressure_cmH2O: 40.0,
            bladder_full_dwell_sec: 10.0,
            bladder_voiding_rate_mL_per_sec: 15.0,
        }
    }
}
