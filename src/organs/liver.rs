//! Liver: toxin clearance, two-sided glucose regulation and bile production.
//!
//! Metabolic capacity is the mean activity of undamaged lobules. It scales
//! the baseline bile and glucose production, the clearance rates, the
//! angiotensinogen substrate the kidneys' renin acts on, and (in reverse) the
//! injury markers ALT, AST and bilirubin.

use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{relax_exponential, MeanReversion, NoiseSource};
use crate::error::{Result, SimError};
use crate::state::Blood;

/// Number of representative lobules
pub const LOBULE_COUNT: usize = 100;

/// Glucose above this is stored (mg/dL)
pub const GLUCOSE_HIGH_MG_PER_DL: f64 = 120.0;
/// Glucose below this is released (mg/dL)
pub const GLUCOSE_LOW_MG_PER_DL: f64 = 80.0;

const BILE_RATE: MeanReversion = MeanReversion::new(0.02, 0.0001, 0.0, 0.009);
const GLUCOSE_RATE: MeanReversion = MeanReversion::new(0.02, 0.00005, 0.0, 0.0012);
const TRANSAMINASE: MeanReversion = MeanReversion::new(0.05, 0.1, 10.0, 400.0);
const BILIRUBIN: MeanReversion = MeanReversion::new(0.05, 0.01, 0.3, 10.0);

/// Angiotensinogen output of a fully healthy liver (AU)
pub const BASELINE_ANGIOTENSINOGEN_AU: f64 = 10.0;

/// Clearance rate constant at full capacity (1/s)
const CLEARANCE_RATE_PER_SEC: f64 = 0.1;

/// Functional unit of the liver
#[derive(Debug, Clone, PartialEq)]
pub struct Lobule {
    /// Relative metabolic activity (1.0 = healthy)
    pub metabolic_activity: f64,
    pub is_damaged: bool,
}

#[derive(Debug, Clone)]
pub struct Liver {
    id: OrganId,
    lobules: Vec<Lobule>,
    metabolic_capacity: f64,

    /// Bile output (mL/s)
    bile_production_mL_per_sec: f64,
    /// Hepatic glucose output (g/s)
    glucose_production_g_per_sec: f64,

    alt_U_per_L: f64,
    ast_U_per_L: f64,
    bilirubin_mg_per_dL: f64,
    /// Renin substrate released into plasma (AU)
    angiotensinogen_au: f64,
}

impl Liver {
    pub fn new(id: OrganId) -> Self {
        Self {
            id,
            lobules: vec![
                Lobule {
                    metabolic_activity: 1.0,
                    is_damaged: false,
                };
                LOBULE_COUNT
            ],
            metabolic_capacity: 1.0,
            bile_production_mL_per_sec: 0.0069,
            glucose_production_g_per_sec: 0.001,
            alt_U_per_L: 25.0,
            ast_U_per_L: 25.0,
            bilirubin_mg_per_dL: 0.8,
            angiotensinogen_au: BASELINE_ANGIOTENSINOGEN_AU,
        }
    }

    pub fn update(&mut self, blood: &mut Blood, noise: &mut NoiseSource, dt_sec: f64) {
        self.metabolic_capacity = self.compute_capacity();
        let capacity = self.metabolic_capacity;

        self.bile_production_mL_per_sec = BILE_RATE.step(
            self.bile_production_mL_per_sec,
            0.0069 * capacity,
            dt_sec,
            noise,
        );
        self.glucose_production_g_per_sec = GLUCOSE_RATE.step(
            self.glucose_production_g_per_sec,
            0.001 * capacity,
            dt_sec,
            noise,
        );

        let transaminase_baseline = 25.0 + (1.0 - capacity) * 200.0;
        self.alt_U_per_L = TRANSAMINASE.step(self.alt_U_per_L, transaminase_baseline, dt_sec, noise);
        self.ast_U_per_L = TRANSAMINASE.step(self.ast_U_per_L, transaminase_baseline, dt_sec, noise);
        self.bilirubin_mg_per_dL = BILIRUBIN.step(
            self.bilirubin_mg_per_dL,
            0.8 + (1.0 - capacity) * 5.0,
            dt_sec,
            noise,
        );

        self.angiotensinogen_au = BASELINE_ANGIOTENSINOGEN_AU * capacity;

        let rate = CLEARANCE_RATE_PER_SEC * capacity;
        blood.toxins_au = relax_exponential(blood.toxins_au, 0.0, rate, dt_sec);

        // Glycogen storage above the band, glycogenolysis below it
        let glucose = blood.glucose_mg_per_dL;
        if glucose > GLUCOSE_HIGH_MG_PER_DL {
            blood.glucose_mg_per_dL =
                relax_exponential(glucose, GLUCOSE_HIGH_MG_PER_DL, rate, dt_sec);
        } else if glucose < GLUCOSE_LOW_MG_PER_DL {
            blood.glucose_mg_per_dL =
                relax_exponential(glucose, GLUCOSE_LOW_MG_PER_DL, rate, dt_sec);
        }
    }

    fn compute_capacity(&self) -> f64 {
        let active: f64 = self
            .lobules
            .iter()
            .filter(|lobule| !lobule.is_damaged)
            .map(|lobule| lobule.metabolic_activity)
            .sum();
        active / self.lobules.len() as f64
    }

    /// Mark a fraction of all lobules as damaged, taken from the healthy ones.
    ///
    /// The fraction is clamped into [0, 1]; capacity drops on the next update.
    pub fn damage_lobules(&mut self, fraction: f64) -> Result<()> {
        if !fraction.is_finite() {
            return Err(SimError::invalid("fraction", fraction, "must be finite"));
        }
        let count = (fraction.clamp(0.0, 1.0) * self.lobules.len() as f64).round() as usize;
        let mut damaged = 0;
        for lobule in self.lobules.iter_mut().filter(|l| !l.is_damaged).take(count) {
            lobule.is_damaged = true;
            damaged += 1;
        }
        log::debug!("Liver: {} lobules damaged", damaged);
        Ok(())
    }

    pub fn damaged_lobule_count(&self) -> usize {
        self.lobules.iter().filter(|l| l.is_damaged).count()
    }

    pub fn metabolic_capacity(&self) -> f64 {
        self.metabolic_capacity
    }

    pub fn bile_production_rate(&self) -> f64 {
        self.bile_production_mL_per_sec
    }

    pub fn glucose_production_rate(&self) -> f64 {
        self.glucose_production_g_per_sec
    }

    pub fn alt_level(&self) -> f64 {
        self.alt_U_per_L
    }

    pub fn ast_level(&self) -> f64 {
        self.ast_U_per_L
    }

    pub fn bilirubin_level(&self) -> f64 {
        self.bilirubin_mg_per_dL
    }

    /// Angiotensinogen available to renin (AU)
    pub fn angiotensinogen(&self) -> f64 {
        self.angiotensinogen_au
    }
}

impl Organ for Liver {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Liver
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Liver Summary ---");
        let _ = writeln!(s, "Metabolic Capacity: {:.1}%", self.metabolic_capacity * 100.0);
        let _ = writeln!(
            s,
            "Bile Production: {:.3} mL/min",
            self.bile_production_mL_per_sec * 60.0
        );
        let _ = writeln!(
            s,
            "Glucose Production: {:.3} g/min",
            self.glucose_production_g_per_sec * 60.0
        );
        let _ = writeln!(s, "ALT Level: {:.1} U/L", self.alt_U_per_L);
        let _ = writeln!(s, "AST Level: {:.1} U/L", self.ast_U_per_L);
        let _ = writeln!(s, "Bilirubin: {:.2} mg/dL", self.bilirubin_mg_per_dL);
        let _ = writeln!(s, "Angiotensinogen: {:.2} AU", self.angiotensinogen_au);
        s
    }
}
