//! Gallbladder: bile storage, concentration and release.
//!
//! While Storing it collects hepatic bile and concentrates it (up to 10×).
//! A contraction starts either on demand from the intestines or
//! spontaneously after a storing interval; it ends once the gallbladder is
//! nearly empty or the contraction has lasted too long.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Liver, Organ, OrganId, OrganKind};
use crate::config::DigestiveParameters;

const MAX_CONCENTRATION: f64 = 10.0;
/// Concentration gain while storing (×/s)
const CONCENTRATION_RATE_PER_SEC: f64 = 0.05;
/// Stored volume below which a contraction ends (mL)
const NEAR_EMPTY_ML: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GallbladderState {
    Storing,
    Contracting,
}

impl GallbladderState {
    pub fn as_str(self) -> &'static str {
        match self {
            GallbladderState::Storing => "Storing/Concentrating",
            GallbladderState::Contracting => "Contracting (Releasing)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gallbladder {
    id: OrganId,
    state: GallbladderState,
    stored_bile_mL: f64,
    concentration_factor: f64,
    time_since_contraction_sec: f64,
    contraction_time_sec: f64,

    capacity_mL: f64,
    release_rate_mL_per_sec: f64,
    max_contraction_sec: f64,
    contraction_interval_sec: f64,
}

impl Gallbladder {
    pub fn new(id: OrganId, params: &DigestiveParameters) -> Self {
        Self {
            id,
            state: GallbladderState::Storing,
            stored_bile_mL: 30.0,
            concentration_factor: 5.0,
            time_since_contraction_sec: 0.0,
            contraction_time_sec: 0.0,
            capacity_mL: params.gallbladder_capacity_mL,
            release_rate_mL_per_sec: params.gallbladder_release_rate_mL_per_sec,
            max_contraction_sec: params.gallbladder_max_contraction_sec,
            contraction_interval_sec: params.gallbladder_contraction_interval_sec,
        }
    }

    /// Collect hepatic bile and run the storage/contraction cycle
    pub fn update(&mut self, dt_sec: f64, liver: Option<&Liver>) {
        let dt = dt_sec.max(0.0);

        if let Some(liver) = liver {
            self.store_bile(liver.bile_production_rate() * dt);
        }

        match self.state {
            GallbladderState::Storing => {
                self.concentration_factor =
                    (self.concentration_factor + CONCENTRATION_RATE_PER_SEC * dt).min(MAX_CONCENTRATION);
                self.time_since_contraction_sec += dt;
                if self.time_since_contraction_sec >= self.contraction_interval_sec {
                    self.begin_contraction();
                }
            }
            GallbladderState::Contracting => {
                // Spontaneous emptying into the duodenum
                let released = (self.release_rate_mL_per_sec * dt).min(self.stored_bile_mL);
                self.stored_bile_mL -= released;
                self.contraction_time_sec += dt;
                if self.stored_bile_mL < NEAR_EMPTY_ML
                    || self.contraction_time_sec >= self.max_contraction_sec
                {
                    self.stored_bile_mL = self.stored_bile_mL.max(0.0);
                    self.concentration_factor = 1.0;
                    self.contraction_time_sec = 0.0;
                    log::debug!("Gallbladder: Contracting -> Storing");
                    self.state = GallbladderState::Storing;
                }
            }
        }
    }

    /// Add bile; only accepted while Storing. Stored volume is clamped to capacity.
    pub fn store_bile(&mut self, volume_mL: f64) {
        if self.state != GallbladderState::Storing || !volume_mL.is_finite() {
            return;
        }
        self.stored_bile_mL = (self.stored_bile_mL + volume_mL).clamp(0.0, self.capacity_mL);
    }

    /// Contract and release up to `rate × dt` of bile, bounded by the stored volume
    pub fn release_bile(&mut self, dt_sec: f64) -> f64 {
        if self.state != GallbladderState::Contracting {
            self.begin_contraction();
        }
        let released = (self.release_rate_mL_per_sec * dt_sec.max(0.0)).min(self.stored_bile_mL);
        self.stored_bile_mL -= released;
        released
    }

    fn begin_contraction(&mut self) {
        log::debug!("Gallbladder: Storing -> Contracting");
        self.state = GallbladderState::Contracting;
        self.time_since_contraction_sec = 0.0;
        self.contraction_time_sec = 0.0;
    }

    pub fn state(&self) -> GallbladderState {
        self.state
    }

    pub fn stored_bile_volume(&self) -> f64 {
        self.stored_bile_mL
    }

    pub fn bile_concentration(&self) -> f64 {
        self.concentration_factor
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_mL
    }
}

impl Organ for Gallbladder {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Gallbladder
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Gallbladder Summary ---");
        let _ = writeln!(s, "State: {}", self.state.as_str());
        let _ = writeln!(s, "Volume: {:.1} / {:.1} mL", self.stored_bile_mL, self.capacity_mL);
        let _ = writeln!(s, "Concentration: {:.1}x", self.concentration_factor);
        s
    }
}
