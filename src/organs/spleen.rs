//! Spleen: blood filtration (red pulp) and immune reserve (white pulp).
//!
//! Both compartments hover around a healthy baseline; nothing outside the
//! spleen drives them yet.

use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{MeanReversion, NoiseSource};

const FILTRATION: MeanReversion = MeanReversion::new(0.05, 0.01, 0.9, 1.1);
const RBC_BREAKDOWN: MeanReversion = MeanReversion::new(0.05, 0.005, 0.45, 0.55);
const LYMPHOCYTES: MeanReversion = MeanReversion::new(0.05, 1.0, 1400.0, 1600.0);
const MACROPHAGES: MeanReversion = MeanReversion::new(0.05, 0.5, 450.0, 550.0);

/// Red pulp: removes aged erythrocytes from circulation
#[derive(Debug, Clone, PartialEq)]
pub struct RedPulp {
    /// Relative filtration rate (1.0 = healthy)
    pub filtration_rate: f64,
    /// Relative erythrocyte breakdown rate
    pub rbc_breakdown_rate: f64,
}

/// White pulp: lymphoid tissue
#[derive(Debug, Clone, PartialEq)]
pub struct WhitePulp {
    /// Resident lymphocytes (millions)
    pub lymphocyte_count_millions: f64,
    /// Resident macrophages (millions)
    pub macrophage_count_millions: f64,
}

#[derive(Debug, Clone)]
pub struct Spleen {
    id: OrganId,
    red_pulp: RedPulp,
    white_pulp: WhitePulp,
}

impl Spleen {
    pub fn new(id: OrganId) -> Self {
        Self {
            id,
            red_pulp: RedPulp {
                filtration_rate: 1.0,
                rbc_breakdown_rate: 0.5,
            },
            white_pulp: WhitePulp {
                lymphocyte_count_millions: 1500.0,
                macrophage_count_millions: 500.0,
            },
        }
    }

    pub fn update(&mut self, noise: &mut NoiseSource, dt_sec: f64) {
        let red = &mut self.red_pulp;
        red.filtration_rate = FILTRATION.step(red.filtration_rate, 1.0, dt_sec, noise);
        red.rbc_breakdown_rate = RBC_BREAKDOWN.step(red.rbc_breakdown_rate, 0.5, dt_sec, noise);

        let white = &mut self.white_pulp;
        white.lymphocyte_count_millions =
            LYMPHOCYTES.step(white.lymphocyte_count_millions, 1500.0, dt_sec, noise);
        white.macrophage_count_millions =
            MACROPHAGES.step(white.macrophage_count_millions, 500.0, dt_sec, noise);
    }

    pub fn red_pulp(&self) -> &RedPulp {
        &self.red_pulp
    }

    pub fn white_pulp(&self) -> &WhitePulp {
        &self.white_pulp
    }

    pub fn rbc_breakdown_rate(&self) -> f64 {
        self.red_pulp.rbc_breakdown_rate
    }

    pub fn lymphocyte_count(&self) -> f64 {
        self.white_pulp.lymphocyte_count_millions
    }
}

impl Organ for Spleen {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Spleen
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Spleen Summary ---");
        let _ = writeln!(s, "Red Pulp Filtration: {:.2}", self.red_pulp.filtration_rate);
        let _ = writeln!(s, "RBC Breakdown Rate: {:.2}", self.red_pulp.rbc_breakdown_rate);
        let _ = writeln!(
            s,
            "Lymphocytes: {:.1} million",
            self.white_pulp.lymphocyte_count_millions
        );
        let _ = writeln!(
            s,
            "Macrophages: {:.1} million",
            self.white_pulp.macrophage_count_millions
        );
        s
    }
}
