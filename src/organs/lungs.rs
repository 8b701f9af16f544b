//! Lungs: respiratory mechanics, gas levels, capnography and gas exchange.
//!
//! Each breath lasts 60/RR seconds with an I:E ratio of 1:1.5. Inspiration
//! is driven by a half-sine pressure wave peaking at 15 cmH2O; expiration is
//! passive recoil proportional to the current volume.
//!
//! Ventilation factor = (tidal volume / 500) × (RR / 16) sets the targets for
//! SpO2 and end-tidal CO2 and the rate of exchange with blood.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{relax_exponential, MeanReversion, NoiseSource};
use crate::error::{Result, SimError};
use crate::state::{Blood, WaveformBuffer, DEFAULT_WAVEFORM_CAPACITY};

/// Accepted respiration rate range (breaths/min)
pub const RESPIRATION_RATE_RANGE: (f64, f64) = (4.0, 60.0);

const TOTAL_LUNG_CAPACITY_ML: f64 = 6000.0;
const INSPIRATION_FRACTION: f64 = 0.4;
const PEAK_DRIVE_PRESSURE_CMH2O: f64 = 15.0;

const OXYGEN_SATURATION: MeanReversion = MeanReversion::new(0.1, 0.02, 94.0, 100.0);
const END_TIDAL_CO2: MeanReversion = MeanReversion::new(0.2, 0.05, 35.0, 50.0);

/// Capnography plateau noise (mmHg, per sample)
const PLATEAU_NOISE_MMHG: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespiratoryPhase {
    Inspiration,
    Expiration,
}

/// Named phases of the capnogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapnographyPhase {
    /// Phase I: dead-space gas, CO2 ≈ 0
    InspiratoryBaseline,
    /// Phase II: rising CO2 as alveolar gas arrives
    ExpiratoryUpstroke,
    /// Phase III: alveolar plateau at etCO2
    AlveolarPlateau,
    /// Phase IV: fall back toward baseline
    InspiratoryDownstroke,
}

impl CapnographyPhase {
    /// Phase for a position within a breath of length `cycle_sec`
    pub fn at(position_sec: f64, cycle_sec: f64) -> Self {
        let fraction = position_sec / cycle_sec;
        if fraction <= INSPIRATION_FRACTION {
            CapnographyPhase::InspiratoryBaseline
        } else if fraction < 0.5 {
            CapnographyPhase::ExpiratoryUpstroke
        } else if fraction < 0.8 {
            CapnographyPhase::AlveolarPlateau
        } else {
            CapnographyPhase::InspiratoryDownstroke
        }
    }
}

/// Whether airway pressure comes from a ventilator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VentilationMode {
    /// Negative-pressure breathing; airway pressure stays at zero
    #[default]
    Spontaneous,
    /// Positive-pressure ventilation; the drive pressure appears at the airway
    Mechanical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LungLobe {
    pub name: &'static str,
    /// Compliance (L/cmH2O)
    pub compliance: f64,
}

#[derive(Debug, Clone)]
pub struct Lungs {
    id: OrganId,

    respiration_rate_per_min: f64,
    tidal_volume_mL: f64,
    oxygen_saturation_pct: f64,
    end_tidal_co2_mmHg: f64,

    phase: RespiratoryPhase,
    cycle_position_sec: f64,
    total_time_sec: f64,

    mode: VentilationMode,
    airway_pressure_cmH2O: f64,
    breath_peak_cmH2O: f64,
    peak_inspiratory_pressure_cmH2O: f64,

    lobes: [LungLobe; 5],
    bronchus_resistance: f64,

    capnography: WaveformBuffer,
}

impl Lungs {
    pub fn new(id: OrganId) -> Self {
        Self::with_capacity(id, DEFAULT_WAVEFORM_CAPACITY)
    }

    pub fn with_capacity(id: OrganId, waveform_capacity: usize) -> Self {
        Self {
            id,
            respiration_rate_per_min: 16.0,
            tidal_volume_mL: 500.0,
            oxygen_saturation_pct: 98.0,
            end_tidal_co2_mmHg: 40.0,
            phase: RespiratoryPhase::Inspiration,
            cycle_position_sec: 0.0,
            total_time_sec: 0.0,
            mode: VentilationMode::Spontaneous,
            airway_pressure_cmH2O: 0.0,
            breath_peak_cmH2O: 0.0,
            peak_inspiratory_pressure_cmH2O: 0.0,
            lobes: [
                LungLobe { name: "Right Upper Lobe", compliance: 0.1 },
                LungLobe { name: "Right Middle Lobe", compliance: 0.07 },
                LungLobe { name: "Right Lower Lobe", compliance: 0.13 },
                LungLobe { name: "Left Upper Lobe", compliance: 0.1 },
                LungLobe { name: "Left Lower Lobe", compliance: 0.1 },
            ],
            bronchus_resistance: 0.8,
            capnography: WaveformBuffer::new(waveform_capacity),
        }
    }

    pub fn update(&mut self, blood: &mut Blood, noise: &mut NoiseSource, dt_sec: f64) {
        let dt = dt_sec.max(0.0);
        self.total_time_sec += dt;

        self.update_mechanics(dt);
        self.update_gas_levels(noise, dt);

        let sample = self.capnography_value(noise);
        self.capnography.push(sample);

        // Gas exchange toward the alveolar side
        let ventilation = self.ventilation_factor().clamp(0.5, 1.5);
        blood.oxygen_saturation_pct = relax_exponential(
            blood.oxygen_saturation_pct,
            self.oxygen_saturation_pct,
            0.8 * ventilation,
            dt,
        );
        blood.co2_partial_pressure_mmHg =
            relax_exponential(blood.co2_partial_pressure_mmHg, 40.0 / ventilation, 0.5, dt);
    }

    fn cycle_sec(&self) -> f64 {
        60.0 / self.respiration_rate_per_min
    }

    fn update_mechanics(&mut self, dt: f64) {
        let cycle_sec = self.cycle_sec();
        let inspiration_sec = cycle_sec * INSPIRATION_FRACTION;

        self.cycle_position_sec += dt;
        if self.cycle_position_sec > cycle_sec {
            self.cycle_position_sec = self.cycle_position_sec.rem_euclid(cycle_sec);
            self.breath_peak_cmH2O = 0.0;
        }

        let next = if self.cycle_position_sec <= inspiration_sec {
            RespiratoryPhase::Inspiration
        } else {
            RespiratoryPhase::Expiration
        };
        if self.phase == RespiratoryPhase::Inspiration && next == RespiratoryPhase::Expiration {
            self.peak_inspiratory_pressure_cmH2O = self.breath_peak_cmH2O;
        }
        self.phase = next;

        let flow_mL_per_sec = match self.phase {
            RespiratoryPhase::Inspiration => {
                let drive = PEAK_DRIVE_PRESSURE_CMH2O
                    * (PI * self.cycle_position_sec / inspiration_sec).sin();
                self.airway_pressure_cmH2O = match self.mode {
                    VentilationMode::Mechanical => drive,
                    VentilationMode::Spontaneous => 0.0,
                };
                self.breath_peak_cmH2O = self.breath_peak_cmH2O.max(self.airway_pressure_cmH2O);
                (drive / self.bronchus_resistance) * 100.0 * self.total_compliance()
            }
            RespiratoryPhase::Expiration => {
                self.airway_pressure_cmH2O = 0.0;
                let recoil = (self.tidal_volume_mL / 500.0) * 5.0;
                -(recoil / self.bronchus_resistance) * 100.0
            }
        };

        self.tidal_volume_mL = (self.tidal_volume_mL + flow_mL_per_sec * dt)
            .clamp(0.0, TOTAL_LUNG_CAPACITY_ML / 2.0);
    }

    fn update_gas_levels(&mut self, noise: &mut NoiseSource, dt: f64) {
        let ventilation = self.ventilation_factor();

        let spo2_target = 98.0 * ventilation.clamp(0.9, 1.0);
        self.oxygen_saturation_pct =
            OXYGEN_SATURATION.step(self.oxygen_saturation_pct, spo2_target, dt, noise);

        let etco2_target = 40.0 / ventilation.clamp(0.8, 1.2);
        self.end_tidal_co2_mmHg = END_TIDAL_CO2.step(self.end_tidal_co2_mmHg, etco2_target, dt, noise);
    }

    fn capnography_value(&self, noise: &mut NoiseSource) -> f64 {
        let cycle_sec = self.cycle_sec();
        let position = self.cycle_position_sec;
        let etco2 = self.end_tidal_co2_mmHg;
        let inspiration_end = cycle_sec * INSPIRATION_FRACTION;
        let plateau_start = cycle_sec * 0.5;
        let plateau_end = cycle_sec * 0.8;

        match CapnographyPhase::at(position, cycle_sec) {
            CapnographyPhase::InspiratoryBaseline => 0.0,
            CapnographyPhase::ExpiratoryUpstroke => {
                etco2 * (position - inspiration_end) / (plateau_start - inspiration_end)
            }
            CapnographyPhase::AlveolarPlateau => etco2 + noise.gaussian(PLATEAU_NOISE_MMHG),
            CapnographyPhase::InspiratoryDownstroke => {
                (etco2 * (1.0 - (position - plateau_end) / (cycle_sec - plateau_end))).max(0.0)
            }
        }
    }

    /// Sum of lobe compliances (L/cmH2O)
    pub fn total_compliance(&self) -> f64 {
        self.lobes.iter().map(|lobe| lobe.compliance).sum()
    }

    pub fn ventilation_factor(&self) -> f64 {
        (self.tidal_volume_mL / 500.0) * (self.respiration_rate_per_min / 16.0)
    }

    /// Permanently scale every lobe's compliance by (1 − fraction).
    ///
    /// The fraction is clamped into [0, 1]; non-finite input is rejected.
    pub fn inflict_damage(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            log::warn!("Lungs rejected damage fraction {}", fraction);
            return Err(SimError::invalid("fraction", fraction, "must be finite"));
        }
        let retained = 1.0 - fraction.clamp(0.0, 1.0);
        for lobe in &mut self.lobes {
            lobe.compliance *= retained;
        }
        log::debug!(
            "Lungs: damage {:.2} applied, total compliance {:.3}",
            fraction,
            self.total_compliance()
        );
        Ok(())
    }

    /// Set the respiration rate (breaths/min), clamped to [4, 60]
    pub fn set_respiration_rate(&mut self, rate_per_min: f64) {
        if !rate_per_min.is_finite() {
            log::warn!("Lungs ignored non-finite respiration rate {}", rate_per_min);
            return;
        }
        self.respiration_rate_per_min =
            rate_per_min.clamp(RESPIRATION_RATE_RANGE.0, RESPIRATION_RATE_RANGE.1);
    }

    pub fn set_ventilation_mode(&mut self, mode: VentilationMode) {
        self.mode = mode;
    }

    pub fn ventilation_mode(&self) -> VentilationMode {
        self.mode
    }

    pub fn respiration_rate(&self) -> f64 {
        self.respiration_rate_per_min
    }

    pub fn tidal_volume(&self) -> f64 {
        self.tidal_volume_mL
    }

    pub fn oxygen_saturation(&self) -> f64 {
        self.oxygen_saturation_pct
    }

    pub fn end_tidal_co2(&self) -> f64 {
        self.end_tidal_co2_mmHg
    }

    /// Instantaneous airway pressure (cmH2O)
    pub fn airway_pressure(&self) -> f64 {
        self.airway_pressure_cmH2O
    }

    /// Peak airway pressure of the last completed inspiration (cmH2O)
    pub fn peak_inspiratory_pressure(&self) -> f64 {
        self.peak_inspiratory_pressure_cmH2O
    }

    pub fn phase(&self) -> RespiratoryPhase {
        self.phase
    }

    pub fn lobes(&self) -> &[LungLobe] {
        &self.lobes
    }

    /// Capnography trace, newest sample first
    pub fn capnography_waveform(&self) -> &WaveformBuffer {
        &self.capnography
    }
}

impl Organ for Lungs {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Lungs
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Lungs Summary ---");
        let _ = writeln!(s, "Respiration Rate: {:.1} breaths/min", self.respiration_rate_per_min);
        let _ = writeln!(s, "Oxygen Saturation (SpO2): {:.1} %", self.oxygen_saturation_pct);
        let _ = writeln!(s, "Tidal Volume: {:.1} mL", self.tidal_volume_mL);
        let _ = writeln!(s, "End-Tidal CO2 (etCO2): {:.1} mmHg", self.end_tidal_co2_mmHg);
        let _ = writeln!(
            s,
            "Peak Airway Pressure: {:.1} cmH2O",
            self.peak_inspiratory_pressure_cmH2O
        );
        let _ = writeln!(s, "Ventilation: {:?}", self.mode);
        let _ = writeln!(s, "Total Compliance: {:.3} L/cmH2O", self.total_compliance());
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn breathe(lungs: &mut Lungs, blood: &mut Blood, seconds: f64, dt: f64) {
        let mut noise = NoiseSource::silent();
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            lungs.update(blood, &mut noise, dt);
        }
    }

    #[test]
    fn test_capnography_phases() {
        let cycle = 3.75;
        assert_eq!(CapnographyPhase::at(0.5, cycle), CapnographyPhase::InspiratoryBaseline);
        assert_eq!(CapnographyPhase::at(1.6, cycle), CapnographyPhase::ExpiratoryUpstroke);
        assert_eq!(CapnographyPhase::at(2.5, cycle), CapnographyPhase::AlveolarPlateau);
        assert_eq!(CapnographyPhase::at(3.5, cycle), CapnographyPhase::InspiratoryDownstroke);
    }

    #[test]
    fn test_capnogram_shape() {
        let mut lungs = Lungs::new(OrganId(2));
        let mut blood = Blood::default();
        breathe(&mut lungs, &mut blood, 3.75, 0.05);
        let trace = lungs.capnography_waveform().to_vec();
        let max = trace.iter().cloned().fold(f64::MIN, f64::max);
        assert!(trace.iter().any(|&v| v == 0.0), "baseline present");
        assert!(max > 30.0 && max <= 50.0, "plateau at etCO2, got {}", max);
        assert!(trace.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_damage_scales_compliance() {
        let mut lungs = Lungs::new(OrganId(2));
        let before = lungs.total_compliance();
        lungs.inflict_damage(0.5).unwrap();
        assert_relative_eq!(lungs.total_compliance(), before * 0.5, epsilon = 1e-12);
        lungs.inflict_damage(2.0).unwrap();
        assert_eq!(lungs.total_compliance(), 0.0);
        assert!(lungs.inflict_damage(f64::NAN).is_err());
    }

    #[test]
    fn test_damage_reduces_tidal_volume() {
        let mut healthy = Lungs::new(OrganId(2));
        let mut injured = Lungs::new(OrganId(2));
        injured.inflict_damage(0.8).unwrap();

        // One full inspiration at 16 breaths/min
        breathe(&mut healthy, &mut Blood::default(), 1.5, 0.01);
        breathe(&mut injured, &mut Blood::default(), 1.5, 0.01);
        assert!(injured.tidal_volume() < healthy.tidal_volume());
        assert!(healthy.tidal_volume() > 1000.0);
    }

    #[test]
    fn test_spontaneous_breathing_keeps_airway_pressure_zero() {
        let mut lungs = Lungs::new(OrganId(2));
        let mut blood = Blood::default();
        breathe(&mut lungs, &mut blood, 10.0, 0.01);
        assert_eq!(lungs.peak_inspiratory_pressure(), 0.0);
    }

    #[test]
    fn test_mechanical_ventilation_latches_peak() {
        let mut lungs = Lungs::new(OrganId(2));
        lungs.set_ventilation_mode(VentilationMode::Mechanical);
        let mut blood = Blood::default();
        breathe(&mut lungs, &mut blood, 2.0, 0.01);
        let pip = lungs.peak_inspiratory_pressure();
        assert!(pip > 14.0 && pip <= 15.0, "pip = {}", pip);
        assert_eq!(lungs.phase(), RespiratoryPhase::Expiration);
    }

    #[test]
    fn test_rate_clamped() {
        let mut lungs = Lungs::new(OrganId(2));
        lungs.set_respiration_rate(100.0);
        assert_eq!(lungs.respiration_rate(), 60.0);
        lungs.set_respiration_rate(0.0);
        assert_eq!(lungs.respiration_rate(), 4.0);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut lungs = Lungs::new(OrganId(2));
        let mut blood = Blood::default();
        lungs.update(&mut blood, &mut NoiseSource::from_seed(5), 0.0);
        assert_eq!(blood, Blood::default());
        assert_eq!(lungs.tidal_volume(), 500.0);
        assert_eq!(lungs.oxygen_saturation(), 98.0);
    }
}
