//! Kidneys: glomerular filtration, urine production and the renin signal.
//!
//! Renin rises while mean arterial pressure is below 85 mmHg and decays
//! toward baseline otherwise. Renin cleaves the liver's angiotensinogen into
//! angiotensin II, which is cleared at a first-order rate:
//!
//! ```text
//! dA/dt = k·(renin · angiotensinogen · 0.1) − k·A
//! ```
//!
//! so blood angiotensin relaxes toward `renin · angiotensinogen · 0.1`
//! (1.0 AU at baseline). This closes the pressure loop through the heart's
//! vasoconstriction term. Without a liver the healthy substrate level is
//! assumed.

use std::fmt::Write;

use super::liver::BASELINE_ANGIOTENSINOGEN_AU;
use super::{Bladder, Heart, Liver, Organ, OrganId, OrganKind};
use crate::dynamics::{relax_exponential, MeanReversion, NoiseSource};
use crate::error::{Result, SimError};
use crate::state::Blood;

/// Number of representative nephrons
pub const NEPHRON_COUNT: usize = 100;

/// Perfusion pressure assumed when no heart is present (mmHg)
const DEFAULT_PERFUSION_MMHG: f64 = 90.0;

/// Mean arterial pressure below which renin is secreted (mmHg)
const RENIN_MAP_THRESHOLD_MMHG: f64 = 85.0;

const GFR: MeanReversion = MeanReversion::new(0.1, 0.5, 0.0, 150.0);
const URINE_OUTPUT: MeanReversion = MeanReversion::random_walk(0.001, 0.0, 0.03);
const SODIUM: MeanReversion = MeanReversion::new(0.05, 0.05, 135.0, 145.0);
const POTASSIUM: MeanReversion = MeanReversion::new(0.05, 0.01, 3.5, 5.0);
const RENIN: MeanReversion = MeanReversion::random_walk(0.0, 0.5, 50.0);

/// Renin decay rate back to baseline (1/s)
const RENIN_DECAY_PER_SEC: f64 = 0.05;
/// Angiotensin II clearance rate (1/s)
const ANGIOTENSIN_CLEARANCE_PER_SEC: f64 = 0.05;
/// Angiotensin II formed per unit renin per unit angiotensinogen
const ANGIOTENSIN_CONVERSION: f64 = 0.1;

/// Steady-state angiotensin II for a renin level and substrate supply (AU)
#[inline]
pub fn angiotensin_steady_state(renin: f64, angiotensinogen_au: f64) -> f64 {
    renin * angiotensinogen_au * ANGIOTENSIN_CONVERSION
}

/// Urine output implied by a filtration rate (mL/s)
#[inline]
fn urine_from_gfr(gfr_mL_per_min: f64) -> f64 {
    gfr_mL_per_min / 60.0 * 0.01
}

/// Functional filtering unit
#[derive(Debug, Clone, PartialEq)]
pub struct Nephron {
    /// Relative filtration efficiency (1.0 = healthy)
    pub filtration_efficiency: f64,
    pub is_damaged: bool,
}

#[derive(Debug, Clone)]
pub struct Kidneys {
    id: OrganId,
    nephrons: Vec<Nephron>,
    filtration_capacity: f64,

    gfr_mL_per_min: f64,
    urine_output_mL_per_sec: f64,
    sodium_mEq_per_L: f64,
    potassium_mEq_per_L: f64,
    /// Renin secretion (ng/mL/hr)
    renin: f64,
}

impl Kidneys {
    pub fn new(id: OrganId) -> Self {
        let gfr = 125.0;
        Self {
            id,
            nephrons: vec![
                Nephron {
                    filtration_efficiency: 1.0,
                    is_damaged: false,
                };
                NEPHRON_COUNT
            ],
            filtration_capacity: 1.0,
            gfr_mL_per_min: gfr,
            urine_output_mL_per_sec: urine_from_gfr(gfr),
            sodium_mEq_per_L: 140.0,
            potassium_mEq_per_L: 4.0,
            renin: 1.0,
        }
    }

    /// Advance one tick. Urine is handed to the bladder if one is present.
    pub fn update(
        &mut self,
        blood: &mut Blood,
        noise: &mut NoiseSource,
        dt_sec: f64,
        heart: Option<&Heart>,
        liver: Option<&Liver>,
        bladder: Option<&mut Bladder>,
    ) {
        self.filtration_capacity = self.compute_capacity();

        let perfusion = heart.map_or(DEFAULT_PERFUSION_MMHG, Heart::aortic_pressure);
        let pressure_modifier = (perfusion / 90.0).clamp(0.5, 1.2);
        let gfr_target = 125.0 * self.filtration_capacity * pressure_modifier;
        self.gfr_mL_per_min = GFR.step(self.gfr_mL_per_min, gfr_target, dt_sec, noise);

        let baseline_urine = urine_from_gfr(self.gfr_mL_per_min);
        self.urine_output_mL_per_sec =
            URINE_OUTPUT.step(baseline_urine, baseline_urine, dt_sec, noise);

        let produced = self.urine_output_mL_per_sec * dt_sec;
        match bladder {
            Some(bladder) => bladder.receive_urine(produced),
            None if produced > 0.0 => {
                log::warn!("Kidneys produced {:.3} mL urine with no bladder present", produced)
            }
            None => {}
        }

        self.sodium_mEq_per_L = SODIUM.step(self.sodium_mEq_per_L, 140.0, dt_sec, noise);
        self.potassium_mEq_per_L = POTASSIUM.step(self.potassium_mEq_per_L, 4.0, dt_sec, noise);

        let map = blood.mean_arterial_pressure_mmHg();
        let renin = if map < RENIN_MAP_THRESHOLD_MMHG {
            self.renin + (RENIN_MAP_THRESHOLD_MMHG - map) * 0.1 * dt_sec
        } else {
            relax_exponential(self.renin, 1.0, RENIN_DECAY_PER_SEC, dt_sec)
        };
        self.renin = RENIN.clamp(renin);

        let angiotensinogen = liver.map_or(BASELINE_ANGIOTENSINOGEN_AU, Liver::angiotensinogen);
        blood.angiotensin_au = relax_exponential(
            blood.angiotensin_au,
            angiotensin_steady_state(self.renin, angiotensinogen),
            ANGIOTENSIN_CLEARANCE_PER_SEC,
            dt_sec,
        );
    }

    fn compute_capacity(&self) -> f64 {
        let active: f64 = self
            .nephrons
            .iter()
            .filter(|n| !n.is_damaged)
            .map(|n| n.filtration_efficiency)
            .sum();
        active / self.nephrons.len() as f64
    }

    /// Mark a fraction of all nephrons as damaged, taken from the healthy ones
    pub fn damage_nephrons(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Err(SimError::invalid("fraction", fraction, "must be finite"));
        }
        let count = (fraction.clamp(0.0, 1.0) * self.nephrons.len() as f64).round() as usize;
        let mut damaged = 0;
        for nephron in self.nephrons.iter_mut().filter(|n| !n.is_damaged).take(count) {
            nephron.is_damaged = true;
            damaged += 1;
        }
        log::debug!("Kidneys: {} nephrons damaged", damaged);
        Ok(())
    }

    pub fn filtration_capacity(&self) -> f64 {
        self.filtration_capacity
    }

    pub fn gfr(&self) -> f64 {
        self.gfr_mL_per_min
    }

    pub fn urine_output_rate(&self) -> f64 {
        self.urine_output_mL_per_sec
    }

    pub fn blood_sodium(&self) -> f64 {
        self.sodium_mEq_per_L
    }

    pub fn blood_potassium(&self) -> f64 {
        self.potassium_mEq_per_L
    }

    pub fn renin_secretion_rate(&self) -> f64 {
        self.renin
    }
}

impl Organ for Kidneys {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Kidneys
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Kidneys Summary ---");
        let _ = writeln!(s, "Glomerular Filtration Rate (GFR): {:.1} mL/min", self.gfr_mL_per_min);
        let _ = writeln!(s, "Urine Output: {:.1} mL/hr", self.urine_output_mL_per_sec * 3600.0);
        let _ = writeln!(s, "Renin Secretion: {:.2} ng/mL/hr", self.renin);
        let _ = writeln!(s, "Blood Sodium: {:.1} mEq/L", self.sodium_mEq_per_L);
        let _ = writeln!(s, "Blood Potassium: {:.2} mEq/L", self.potassium_mEq_per_L);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenalParameters;

    #[test]
    fn test_zero_dt_keeps_baseline() {
        let mut kidneys = Kidneys::new(OrganId(5));
        let mut blood = Blood::default();
        let mut noise = NoiseSource::from_seed(1);
        kidneys.update(&mut blood, &mut noise, 0.0, None, None, None);
        assert_eq!(kidneys.gfr(), 125.0);
        assert_eq!(kidneys.urine_output_rate(), urine_from_gfr(125.0));
        assert_eq!(blood, Blood::default());
    }

    #[test]
    fn test_urine_flows_into_bladder() {
        let mut kidneys = Kidneys::new(OrganId(5));
        let mut bladder = Bladder::new(OrganId(6), &RenalParameters::default());
        let mut blood = Blood::default();
        let mut noise = NoiseSource::silent();
        let before = bladder.volume();
        kidneys.update(&mut blood, &mut noise, 10.0, None, None, Some(&mut bladder));
        assert!(bladder.volume() > before);
    }

    #[test]
    fn test_hypotension_raises_renin_and_angiotensin() {
        let mut kidneys = Kidneys::new(OrganId(5));
        let mut blood = Blood::default();
        blood.blood_pressure.systolic_mmHg = 80.0;
        blood.blood_pressure.diastolic_mmHg = 50.0;
        let mut noise = NoiseSource::silent();
        for _ in 0..20 {
            kidneys.update(&mut blood, &mut noise, 1.0, None, None, None);
        }
        assert!(kidneys.renin_secretion_rate() > 10.0);
        assert!(blood.angiotensin_au > 1.0);
    }

    #[test]
    fn test_renin_decays_when_pressure_normal() {
        let mut kidneys = Kidneys::new(OrganId(5));
        kidneys.renin = 20.0;
        let mut blood = Blood::default();
        kidneys.update(&mut blood, &mut NoiseSource::silent(), 100.0, None, None, None);
        assert!(kidneys.renin_secretion_rate() < 1.2);
    }

    #[test]
    fn test_angiotensin_needs_hepatic_substrate() {
        let mut liver = Liver::new(OrganId(3));
        liver.damage_lobules(0.5).unwrap();
        let mut blood = Blood::default();
        let mut noise = NoiseSource::silent();
        liver.update(&mut blood, &mut noise, 0.0);
        assert_eq!(liver.angiotensinogen(), 5.0);

        let mut kidneys = Kidneys::new(OrganId(5));
        kidneys.update(&mut blood, &mut noise, 200.0, None, Some(&liver), None);
        assert!((blood.angiotensin_au - 0.5).abs() < 1e-3, "got {}", blood.angiotensin_au);
    }

    #[test]
    fn test_baseline_angiotensin_is_stationary() {
        assert_eq!(angiotensin_steady_state(1.0, BASELINE_ANGIOTENSINOGEN_AU), 1.0);
        let liver = Liver::new(OrganId(3));
        let mut kidneys = Kidneys::new(OrganId(5));
        let mut blood = Blood::default();
        kidneys.update(&mut blood, &mut NoiseSource::silent(), 5.0, None, Some(&liver), None);
        assert_eq!(blood.angiotensin_au, 1.0);
    }

    #[test]
    fn test_nephron_damage_lowers_gfr() {
        let mut kidneys = Kidneys::new(OrganId(5));
        kidneys.damage_nephrons(0.6).unwrap();
        let mut blood = Blood::default();
        let mut noise = NoiseSource::silent();
        for _ in 0..100 {
            kidneys.update(&mut blood, &mut noise, 1.0, None, None, None);
        }
        assert!((kidneys.filtration_capacity() - 0.4).abs() < 1e-12);
        assert!((kidneys.gfr() - 50.0).abs() < 0.1);
    }
}
