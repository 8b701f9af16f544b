//! Intestines: digestion and absorption across four segments.
//!
//! While chyme is present the intestines draw bile from the gallbladder and
//! juice from the pancreas. Digestion runs five times faster when both are
//! present. Absorbed nutrients raise blood glucose.
//!
//! Chyme, bile and enzymes are all depleted in proportion to what is held:
//! chyme decays exponentially at the combined nutrient and water absorption
//! rate, and a residue below [`RESIDUAL_CHYME_ML`] counts as empty.

use std::fmt::Write;

use super::{DigestiveEnzymes, Gallbladder, Organ, OrganId, OrganKind, Pancreas};
use crate::dynamics::{relax_exponential, MeanReversion, NoiseSource};
use crate::state::Blood;

/// Duodenal motility; the lower segments hold their fixed rates
const MOTILITY: MeanReversion = MeanReversion::new(0.05, 0.01, 0.9, 1.1);

/// Digestion multiplier with both bile and enzymes present
const ASSISTED_EFFICIENCY: f64 = 5.0;
/// Fraction of bile and enzymes consumed per second
const SECRETION_TURNOVER_PER_SEC: f64 = 0.1;
/// Chyme below this volume is treated as fully absorbed (mL)
pub const RESIDUAL_CHYME_ML: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct IntestinalSegment {
    pub name: &'static str,
    pub length_m: f64,
    pub motility: f64,
    pub nutrient_absorption_rate: f64,
    pub water_absorption_rate: f64,
}

impl IntestinalSegment {
    fn new(
        name: &'static str,
        length_m: f64,
        motility: f64,
        nutrient_absorption_rate: f64,
        water_absorption_rate: f64,
    ) -> Self {
        Self {
            name,
            length_m,
            motility,
            nutrient_absorption_rate,
            water_absorption_rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Intestines {
    id: OrganId,
    chyme_mL: f64,
    bile_mL: f64,
    enzyme_mL: f64,
    amylase_U_per_L: f64,
    lipase_U_per_L: f64,
    digestion_efficiency: f64,
    /// Duodenum, jejunum, ileum, colon
    segments: [IntestinalSegment; 4],
}

impl Intestines {
    pub fn new(id: OrganId) -> Self {
        Self {
            id,
            chyme_mL: 0.0,
            bile_mL: 0.0,
            enzyme_mL: 0.0,
            amylase_U_per_L: 0.0,
            lipase_U_per_L: 0.0,
            digestion_efficiency: 1.0,
            segments: [
                IntestinalSegment::new("Duodenum", 0.25, 1.0, 0.5, 0.1),
                IntestinalSegment::new("Jejunum", 2.5, 1.0, 1.0, 0.3),
                IntestinalSegment::new("Ileum", 3.0, 1.0, 0.8, 0.5),
                IntestinalSegment::new("Colon", 1.5, 0.5, 0.1, 1.0),
            ],
        }
    }

    pub fn update(
        &mut self,
        blood: &mut Blood,
        noise: &mut NoiseSource,
        dt_sec: f64,
        gallbladder: Option<&mut Gallbladder>,
        pancreas: Option<&mut Pancreas>,
    ) {
        let dt = dt_sec.max(0.0);

        if self.chyme_mL > 0.0 {
            if let Some(gallbladder) = gallbladder {
                let bile = gallbladder.release_bile(dt);
                self.receive_bile(bile);
            }
            if let Some(pancreas) = pancreas {
                let enzymes = pancreas.release_enzymes(dt);
                self.receive_enzymes(&enzymes);
            }

            self.digestion_efficiency = if self.bile_mL > 0.0 && self.enzyme_mL > 0.0 {
                ASSISTED_EFFICIENCY
            } else {
                1.0
            };

            // The colon absorbs water only
            let nutrient_rate: f64 = self.segments[..3]
                .iter()
                .map(|s| s.nutrient_absorption_rate)
                .sum::<f64>()
                * self.digestion_efficiency;
            let water_rate: f64 = self.segments.iter().map(|s| s.water_absorption_rate).sum();

            blood.glucose_mg_per_dL += nutrient_rate * self.chyme_mL * 0.001 * dt;

            let absorption_per_sec = nutrient_rate * 0.01 + water_rate * 0.1;
            self.chyme_mL = relax_exponential(self.chyme_mL, 0.0, absorption_per_sec, dt);
            if self.chyme_mL < RESIDUAL_CHYME_ML {
                self.chyme_mL = 0.0;
            }

            let retained = (1.0 - SECRETION_TURNOVER_PER_SEC * dt).max(0.0);
            self.bile_mL *= retained;
            self.enzyme_mL *= retained;
            if self.enzyme_mL <= 0.0 {
                self.amylase_U_per_L = 0.0;
                self.lipase_U_per_L = 0.0;
            }
        }

        let duodenum = &mut self.segments[0];
        duodenum.motility = MOTILITY.step(duodenum.motility, 1.0, dt, noise);
    }

    /// Chyme from the stomach; negative or non-finite volumes are ignored
    pub fn receive_chyme(&mut self, volume_mL: f64) {
        if volume_mL.is_finite() && volume_mL > 0.0 {
            self.chyme_mL += volume_mL;
        }
    }

    /// Bile from the gallbladder
    pub fn receive_bile(&mut self, volume_mL: f64) {
        if volume_mL.is_finite() && volume_mL > 0.0 {
            self.bile_mL += volume_mL;
        }
    }

    /// Pancreatic juice; concentrations mix by volume
    pub fn receive_enzymes(&mut self, enzymes: &DigestiveEnzymes) {
        if !enzymes.volume_mL.is_finite() || enzymes.volume_mL <= 0.0 {
            return;
        }
        let total = self.enzyme_mL + enzymes.volume_mL;
        self.amylase_U_per_L = (self.amylase_U_per_L * self.enzyme_mL
            + enzymes.amylase_U_per_L * enzymes.volume_mL)
            / total;
        self.lipase_U_per_L = (self.lipase_U_per_L * self.enzyme_mL
            + enzymes.lipase_U_per_L * enzymes.volume_mL)
            / total;
        self.enzyme_mL = total;
    }

    pub fn total_chyme_volume(&self) -> f64 {
        self.chyme_mL
    }

    pub fn bile_volume(&self) -> f64 {
        self.bile_mL
    }

    pub fn enzyme_volume(&self) -> f64 {
        self.enzyme_mL
    }

    pub fn amylase(&self) -> f64 {
        self.amylase_U_per_L
    }

    pub fn lipase(&self) -> f64 {
        self.lipase_U_per_L
    }

    pub fn digestion_efficiency(&self) -> f64 {
        self.digestion_efficiency
    }

    pub fn segments(&self) -> &[IntestinalSegment] {
        &self.segments
    }
}

impl Organ for Intestines {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Intestines
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Intestines Summary ---");
        let _ = writeln!(s, "Chyme Volume: {:.2} mL", self.chyme_mL);
        let _ = writeln!(s, "Bile Volume: {:.2} mL", self.bile_mL);
        let _ = writeln!(s, "Enzyme Volume: {:.2} mL", self.enzyme_mL);
        let _ = writeln!(s, "Amylase: {:.2} U/L", self.amylase_U_per_L);
        let _ = writeln!(s, "Lipase: {:.2} U/L", self.lipase_U_per_L);
        let _ = writeln!(s);
        let _ = writeln!(s, "--- Segments ---");
        for segment in &self.segments {
            let _ = writeln!(
                s,
                "{}: {:.2} m, motility {:.2}, nutrient abs. {:.2}, water abs. {:.2}",
                segment.name,
                segment.length_m,
                segment.motility,
                segment.nutrient_absorption_rate,
                segment.water_absorption_rate
            );
        }
        s
    }
}
