//! Brain: perfusion, consciousness scoring and autonomic control.
//!
//! The brain closes the top of the feedback network:
//! - chemoreceptor reflex: blood gases → respiration rate → Lungs
//! - baroreceptor reflex: mean arterial pressure → heart rate → Heart
//!
//! Glasgow Coma Scale sub-scores are step functions of SpO2, PaCO2 and
//! cerebral perfusion pressure, then capped by toxin load, spinal motor
//! integrity and inferred mechanical ventilation.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

use super::{Heart, Lungs, Organ, OrganId, OrganKind, SpinalCord, TractStatus};
use crate::dynamics::{MeanReversion, NoiseSource};
use crate::state::{Blood, WaveformBuffer, DEFAULT_WAVEFORM_CAPACITY};

const INTRACRANIAL_PRESSURE: MeanReversion = MeanReversion::random_walk(0.01, 8.0, 12.0);
/// MAP fallback when no heart is present
const FALLBACK_MAP: MeanReversion = MeanReversion::new(0.1, 0.1, 85.0, 95.0);

const RESPIRATION_TARGET_RANGE: (f64, f64) = (8.0, 35.0);
const HEART_RATE_TARGET_RANGE: (f64, f64) = (50.0, 160.0);
const RESPIRATION_ADJUST_PER_SEC: f64 = 0.5;
const HEART_RATE_ADJUST_PER_SEC: f64 = 0.4;

/// Airway pressure above which ventilation is assumed mechanical (cmH2O)
const MECHANICAL_VENTILATION_PIP_CMH2O: f64 = 5.0;

/// Named cortical/cerebellar region
#[derive(Debug, Clone, PartialEq)]
pub struct BrainRegion {
    pub name: &'static str,
    /// Relative activity level
    pub activity_level: f64,
    /// Regional metabolic rate (mL O2/100 g/min)
    pub metabolic_rate: f64,
    baseline_activity: f64,
}

impl BrainRegion {
    fn new(name: &'static str, activity_level: f64, metabolic_rate: f64) -> Self {
        Self {
            name,
            activity_level,
            metabolic_rate,
            baseline_activity: activity_level,
        }
    }

    fn activity_rule(&self) -> MeanReversion {
        MeanReversion::new(
            0.1,
            0.005,
            self.baseline_activity - 0.1,
            self.baseline_activity + 0.1,
        )
    }
}

/// Glasgow Coma Scale breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlasgowComaScale {
    /// Eye opening (1-4)
    pub eye: u8,
    /// Verbal response (1-5)
    pub verbal: u8,
    /// Motor response (1-6)
    pub motor: u8,
}

impl GlasgowComaScale {
    pub const FULLY_CONSCIOUS: GlasgowComaScale = GlasgowComaScale {
        eye: 4,
        verbal: 5,
        motor: 6,
    };

    /// Composite score (3-15)
    pub fn total(&self) -> u8 {
        self.eye + self.verbal + self.motor
    }

    /// Sub-scores from gas levels and perfusion, before confounders
    pub fn assess(spo2_pct: f64, co2_mmHg: f64, cpp_mmHg: f64) -> Self {
        let eye = if spo2_pct > 94.0 && cpp_mmHg > 60.0 {
            4
        } else if spo2_pct > 90.0 && cpp_mmHg > 55.0 {
            3
        } else if spo2_pct > 80.0 || cpp_mmHg > 50.0 {
            2
        } else {
            1
        };

        let verbal = if co2_mmHg < 45.0 && spo2_pct > 94.0 {
            5
        } else if co2_mmHg < 55.0 && spo2_pct > 90.0 {
            4
        } else if co2_mmHg < 65.0 || spo2_pct > 85.0 {
            3
        } else if co2_mmHg < 75.0 || spo2_pct > 75.0 {
            2
        } else {
            1
        };

        let motor = if cpp_mmHg > 60.0 && spo2_pct > 92.0 {
            6
        } else if cpp_mmHg > 55.0 && spo2_pct > 88.0 {
            5
        } else if cpp_mmHg > 50.0 || spo2_pct > 80.0 {
            4
        } else if cpp_mmHg > 45.0 || spo2_pct > 70.0 {
            3
        } else if cpp_mmHg > 40.0 || spo2_pct > 60.0 {
            2
        } else {
            1
        };

        Self { eye, verbal, motor }
    }

    /// Cap sub-scores for circulating toxin load
    fn apply_toxins(&mut self, toxins_au: f64) {
        if toxins_au > 50.0 {
            self.eye = self.eye.min(2);
            self.verbal = self.verbal.min(3);
            self.motor = self.motor.min(4);
        }
        if toxins_au > 80.0 {
            self.eye = 1;
            self.verbal = self.verbal.min(2);
            self.motor = self.motor.min(3);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Brain {
    id: OrganId,
    total_time_sec: f64,

    gcs: GlasgowComaScale,
    intracranial_pressure_mmHg: f64,
    cerebral_perfusion_pressure_mmHg: f64,
    mean_arterial_pressure_mmHg: f64,

    target_respiration_rate: f64,
    target_heart_rate_bpm: f64,

    regions: [BrainRegion; 5],
    eeg: WaveformBuffer,
}

impl Brain {
    pub fn new(id: OrganId) -> Self {
        Self::with_capacity(id, DEFAULT_WAVEFORM_CAPACITY)
    }

    pub fn with_capacity(id: OrganId, waveform_capacity: usize) -> Self {
        Self {
            id,
            total_time_sec: 0.0,
            gcs: GlasgowComaScale::FULLY_CONSCIOUS,
            intracranial_pressure_mmHg: 10.0,
            cerebral_perfusion_pressure_mmHg: 80.0,
            mean_arterial_pressure_mmHg: 90.0,
            target_respiration_rate: 16.0,
            target_heart_rate_bpm: 75.0,
            regions: [
                BrainRegion::new("Frontal Lobe", 0.8, 50.0),
                BrainRegion::new("Temporal Lobe", 0.7, 50.0),
                BrainRegion::new("Parietal Lobe", 0.7, 50.0),
                BrainRegion::new("Occipital Lobe", 0.8, 55.0),
                BrainRegion::new("Cerebellum", 0.6, 60.0),
            ],
            eeg: WaveformBuffer::new(waveform_capacity),
        }
    }

    /// Advance one tick and drive the heart and lungs set-points
    pub fn update(
        &mut self,
        blood: &mut Blood,
        noise: &mut NoiseSource,
        dt_sec: f64,
        heart: Option<&mut Heart>,
        mut lungs: Option<&mut Lungs>,
        spinal_cord: Option<&SpinalCord>,
    ) {
        let dt = dt_sec.max(0.0);
        self.total_time_sec += dt;

        self.mean_arterial_pressure_mmHg = match heart.as_deref() {
            Some(heart) => heart.aortic_pressure(),
            None => FALLBACK_MAP.step(self.mean_arterial_pressure_mmHg, 90.0, dt, noise),
        };

        for region in &mut self.regions {
            let rule = region.activity_rule();
            region.activity_level =
                rule.step(region.activity_level, region.baseline_activity, dt, noise);
        }

        self.intracranial_pressure_mmHg = INTRACRANIAL_PRESSURE.step(
            self.intracranial_pressure_mmHg,
            self.intracranial_pressure_mmHg,
            dt,
            noise,
        );
        self.cerebral_perfusion_pressure_mmHg =
            (self.mean_arterial_pressure_mmHg - self.intracranial_pressure_mmHg).max(0.0);

        self.update_autonomic_control(blood, dt, heart, lungs.as_deref_mut());

        let eeg = self.eeg_value(noise);
        self.eeg.push(eeg);

        // Metabolism scales with mean regional activity
        let activity = self.average_activity();
        blood.oxygen_saturation_pct -= 0.1 * activity * dt;
        blood.co2_partial_pressure_mmHg += 0.08 * activity * dt;

        let peak_airway_pressure = lungs.map(|l| l.peak_inspiratory_pressure());
        self.update_gcs(blood, spinal_cord, peak_airway_pressure);
    }

    fn update_autonomic_control(
        &mut self,
        blood: &Blood,
        dt: f64,
        heart: Option<&mut Heart>,
        lungs: Option<&mut Lungs>,
    ) {
        // Chemoreceptor reflex
        let co2_drive = (blood.co2_partial_pressure_mmHg - 40.0).max(0.0) * 0.5;
        let o2_drive = (98.0 - blood.oxygen_saturation_pct).max(0.0) * 0.8;
        let respiration_target = 16.0 + co2_drive + o2_drive;
        self.target_respiration_rate += (respiration_target - self.target_respiration_rate)
            * (RESPIRATION_ADJUST_PER_SEC * dt).min(1.0);
        self.target_respiration_rate = self
            .target_respiration_rate
            .clamp(RESPIRATION_TARGET_RANGE.0, RESPIRATION_TARGET_RANGE.1);
        if let Some(lungs) = lungs {
            lungs.set_respiration_rate(self.target_respiration_rate);
        }

        // Baroreceptor reflex
        let map = blood.mean_arterial_pressure_mmHg();
        let heart_rate_target = 75.0 + (90.0 - map) * 0.4;
        self.target_heart_rate_bpm += (heart_rate_target - self.target_heart_rate_bpm)
            * (HEART_RATE_ADJUST_PER_SEC * dt).min(1.0);
        self.target_heart_rate_bpm = self
            .target_heart_rate_bpm
            .clamp(HEART_RATE_TARGET_RANGE.0, HEART_RATE_TARGET_RANGE.1);
        if let Some(heart) = heart {
            heart.set_heart_rate(self.target_heart_rate_bpm);
        }
    }

    fn update_gcs(
        &mut self,
        blood: &Blood,
        spinal_cord: Option<&SpinalCord>,
        peak_airway_pressure: Option<f64>,
    ) {
        let mut gcs = GlasgowComaScale::assess(
            blood.oxygen_saturation_pct,
            blood.co2_partial_pressure_mmHg,
            self.cerebral_perfusion_pressure_mmHg,
        );
        gcs.apply_toxins(blood.toxins_au);

        if spinal_cord.is_some_and(|cord| cord.motor_pathway_status() != TractStatus::Normal) {
            gcs.motor = 1;
        }
        // Intubated patients cannot be assessed verbally
        if peak_airway_pressure.is_some_and(|pip| pip > MECHANICAL_VENTILATION_PIP_CMH2O) {
            gcs.verbal = 1;
        }

        self.gcs = gcs;
    }

    fn eeg_value(&self, noise: &mut NoiseSource) -> f64 {
        let t = self.total_time_sec;
        let alpha = 0.5 * (2.0 * PI * 10.0 * t).sin();
        let beta = 0.3 * (2.0 * PI * 20.0 * t).sin();
        (alpha + beta + noise.gaussian(0.1)) * 20.0
    }

    pub fn average_activity(&self) -> f64 {
        self.regions.iter().map(|r| r.activity_level).sum::<f64>() / self.regions.len() as f64
    }

    pub fn gcs(&self) -> u8 {
        self.gcs.total()
    }

    pub fn gcs_breakdown(&self) -> GlasgowComaScale {
        self.gcs
    }

    pub fn gcs_eye(&self) -> u8 {
        self.gcs.eye
    }

    pub fn gcs_verbal(&self) -> u8 {
        self.gcs.verbal
    }

    pub fn gcs_motor(&self) -> u8 {
        self.gcs.motor
    }

    pub fn intracranial_pressure(&self) -> f64 {
        self.intracranial_pressure_mmHg
    }

    pub fn cerebral_perfusion_pressure(&self) -> f64 {
        self.cerebral_perfusion_pressure_mmHg
    }

    pub fn mean_arterial_pressure(&self) -> f64 {
        self.mean_arterial_pressure_mmHg
    }

    pub fn target_respiration_rate(&self) -> f64 {
        self.target_respiration_rate
    }

    pub fn target_heart_rate(&self) -> f64 {
        self.target_heart_rate_bpm
    }

    pub fn regions(&self) -> &[BrainRegion] {
        &self.regions
    }

    /// EEG trace (µV), newest sample first
    pub fn eeg_waveform(&self) -> &WaveformBuffer {
        &self.eeg
    }
}

impl Organ for Brain {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Brain
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Brain Summary ---");
        let _ = writeln!(
            s,
            "Glasgow Coma Scale (GCS): {} (E{} V{} M{})",
            self.gcs.total(),
            self.gcs.eye,
            self.gcs.verbal,
            self.gcs.motor
        );
        let _ = writeln!(s, "Intracranial Pressure (ICP): {:.1} mmHg", self.intracranial_pressure_mmHg);
        let _ = writeln!(s, "Mean Arterial Pressure (MAP): {:.1} mmHg", self.mean_arterial_pressure_mmHg);
        let _ = writeln!(
            s,
            "Cerebral Perfusion (CPP): {:.1} mmHg",
            self.cerebral_perfusion_pressure_mmHg
        );
        for region in &self.regions {
            let _ = writeln!(s, " {}: activity {:.2}", region.name, region.activity_level);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organs::{SpinalTract, VentilationMode};

    #[test]
    fn test_assess_healthy() {
        let gcs = GlasgowComaScale::assess(98.0, 40.0, 80.0);
        assert_eq!(gcs, GlasgowComaScale::FULLY_CONSCIOUS);
        assert_eq!(gcs.total(), 15);
    }

    #[test]
    fn test_assess_profound_hypoxia() {
        let gcs = GlasgowComaScale::assess(50.0, 80.0, 30.0);
        assert_eq!(gcs.total(), 3);
    }

    #[test]
    fn test_toxin_caps() {
        let mut gcs = GlasgowComaScale::FULLY_CONSCIOUS;
        gcs.apply_toxins(60.0);
        assert_eq!((gcs.eye, gcs.verbal, gcs.motor), (2, 3, 4));
        gcs.apply_toxins(90.0);
        assert_eq!((gcs.eye, gcs.verbal, gcs.motor), (1, 2, 3));
    }

    #[test]
    fn test_no_heart_uses_fallback_map() {
        let mut brain = Brain::new(OrganId(3));
        let mut blood = Blood::default();
        let mut noise = NoiseSource::from_seed(9);
        for _ in 0..500 {
            brain.update(&mut blood, &mut noise, 1.0, None, None, None);
            assert!(FALLBACK_MAP.contains(brain.mean_arterial_pressure()));
            blood.clamp_to_bounds();
        }
    }

    #[test]
    fn test_motor_injury_forces_motor_one() {
        let mut brain = Brain::new(OrganId(3));
        let mut cord = SpinalCord::new(OrganId(13));
        cord.set_tract_status(SpinalTract::Motor, TractStatus::Impaired);
        let mut blood = Blood::default();
        brain.update(&mut blood, &mut NoiseSource::silent(), 0.1, None, None, Some(&cord));
        assert_eq!(brain.gcs_motor(), 1);
        assert_eq!(brain.gcs_eye(), 4);
    }

    #[test]
    fn test_mechanical_ventilation_forces_verbal_one() {
        let mut brain = Brain::new(OrganId(3));
        let mut lungs = Lungs::new(OrganId(2));
        lungs.set_ventilation_mode(VentilationMode::Mechanical);
        let mut blood = Blood::default();
        let mut noise = NoiseSource::silent();
        for _ in 0..200 {
            lungs.update(&mut blood, &mut noise, 0.01);
        }
        brain.update(&mut blood, &mut noise, 0.01, None, Some(&mut lungs), None);
        assert_eq!(brain.gcs_verbal(), 1);
    }

    #[test]
    fn test_hypercapnia_raises_respiration() {
        let mut brain = Brain::new(OrganId(3));
        let mut lungs = Lungs::new(OrganId(2));
        let mut blood = Blood {
            co2_partial_pressure_mmHg: 60.0,
            ..Blood::default()
        };
        let mut noise = NoiseSource::silent();
        for _ in 0..20 {
            blood.co2_partial_pressure_mmHg = 60.0;
            brain.update(&mut blood, &mut noise, 1.0, None, Some(&mut lungs), None);
        }
        assert!(lungs.respiration_rate() > 24.0);
        assert!(brain.target_respiration_rate() <= 35.0);
    }

    #[test]
    fn test_hypotension_raises_heart_rate() {
        let mut brain = Brain::new(OrganId(3));
        let mut heart = Heart::new(OrganId(1));
        let mut blood = Blood::default();
        let mut noise = NoiseSource::silent();
        for _ in 0..30 {
            blood.blood_pressure.systolic_mmHg = 80.0;
            blood.blood_pressure.diastolic_mmHg = 50.0;
            brain.update(&mut blood, &mut noise, 1.0, Some(&mut heart), None, None);
        }
        assert!(heart.intrinsic_heart_rate() > 80.0);
    }

    #[test]
    fn test_brain_consumes_oxygen() {
        let mut brain = Brain::new(OrganId(3));
        let mut blood = Blood::default();
        brain.update(&mut blood, &mut NoiseSource::silent(), 1.0, None, None, None);
        assert!(blood.oxygen_saturation_pct < 98.0);
        assert!(blood.co2_partial_pressure_mmHg > 40.0);
        assert_eq!(brain.eeg_waveform().len(), 1);
    }
}
