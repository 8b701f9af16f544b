//! Pancreas: endocrine (insulin, glucagon) and exocrine (amylase, lipase).
//!
//! Insulin rises in proportion to glucose above 120 mg/dL and otherwise
//! decays; glucagon mirrors it below 80 mg/dL. Enzyme concentrations hover
//! around a baseline and are handed out on demand by [`Pancreas::release_enzymes`].

use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{MeanReversion, NoiseSource};
use crate::state::{Blood, Range};

const INSULIN_U_PER_HR: Range = Range::new(0.5, 10.0);
const GLUCAGON_NG_PER_HR: Range = Range::new(20.0, 100.0);
const AMYLASE: MeanReversion = MeanReversion::new(0.05, 0.2, 60.0, 100.0);
const LIPASE: MeanReversion = MeanReversion::new(0.05, 0.2, 20.0, 60.0);

const GLUCOSE_HIGH_MG_PER_DL: f64 = 120.0;
const GLUCOSE_LOW_MG_PER_DL: f64 = 80.0;

/// Exocrine secretion volume rate (mL/s)
const ENZYME_SECRETION_ML_PER_SEC: f64 = 5.0 / 60.0;

/// Packet of pancreatic juice
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DigestiveEnzymes {
    pub volume_mL: f64,
    pub amylase_U_per_L: f64,
    pub lipase_U_per_L: f64,
}

#[derive(Debug, Clone)]
pub struct Pancreas {
    id: OrganId,
    insulin_U_per_hr: f64,
    glucagon_ng_per_hr: f64,
    amylase_U_per_L: f64,
    lipase_U_per_L: f64,
}

impl Pancreas {
    pub fn new(id: OrganId) -> Self {
        Self {
            id,
            insulin_U_per_hr: 1.0,
            glucagon_ng_per_hr: 50.0,
            amylase_U_per_L: 80.0,
            lipase_U_per_L: 40.0,
        }
    }

    pub fn update(&mut self, blood: &Blood, noise: &mut NoiseSource, dt_sec: f64) {
        let dt = dt_sec.max(0.0);
        let glucose = blood.glucose_mg_per_dL;

        let insulin = if glucose > GLUCOSE_HIGH_MG_PER_DL {
            self.insulin_U_per_hr + (glucose - GLUCOSE_HIGH_MG_PER_DL) * 0.1 * dt
        } else {
            self.insulin_U_per_hr - 0.5 * dt
        };
        self.insulin_U_per_hr = INSULIN_U_PER_HR.clamp(insulin);

        let glucagon = if glucose < GLUCOSE_LOW_MG_PER_DL {
            self.glucagon_ng_per_hr + (GLUCOSE_LOW_MG_PER_DL - glucose) * 0.2 * dt
        } else {
            self.glucagon_ng_per_hr - 1.0 * dt
        };
        self.glucagon_ng_per_hr = GLUCAGON_NG_PER_HR.clamp(glucagon);

        self.amylase_U_per_L = AMYLASE.step(self.amylase_U_per_L, 80.0, dt, noise);
        self.lipase_U_per_L = LIPASE.step(self.lipase_U_per_L, 40.0, dt, noise);
    }

    /// Pancreatic juice secreted over `dt_sec`
    pub fn release_enzymes(&mut self, dt_sec: f64) -> DigestiveEnzymes {
        DigestiveEnzymes {
            volume_mL: ENZYME_SECRETION_ML_PER_SEC * dt_sec.max(0.0),
            amylase_U_per_L: self.amylase_U_per_L,
            lipase_U_per_L: self.lipase_U_per_L,
        }
    }

    pub fn insulin_secretion(&self) -> f64 {
        self.insulin_U_per_hr
    }

    pub fn glucagon_secretion(&self) -> f64 {
        self.glucagon_ng_per_hr
    }

    pub fn amylase_secretion(&self) -> f64 {
        self.amylase_U_per_L
    }

    pub fn lipase_secretion(&self) -> f64 {
        self.lipase_U_per_L
    }
}

impl Organ for Pancreas {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Pancreas
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Pancreas Summary ---");
        let _ = writeln!(s, "--- Endocrine Function ---");
        let _ = writeln!(s, "Insulin Secretion: {:.1} units/hr", self.insulin_U_per_hr);
        let _ = writeln!(s, "Glucagon Secretion: {:.1} ng/hr", self.glucagon_ng_per_hr);
        let _ = writeln!(s, "--- Exocrine Function ---");
        let _ = writeln!(s, "Amylase Secretion: {:.1} U/L", self.amylase_U_per_L);
        let _ = writeln!(s, "Lipase Secretion: {:.1} U/L", self.lipase_U_per_L);
        s
    }
}
