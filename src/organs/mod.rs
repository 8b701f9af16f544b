//! Organ models.
//!
//! Every organ owns its local physiological state and advances it once per
//! tick. Cross-organ coupling happens through the shared [`Blood`] record and
//! through explicit handoffs between neighbors:
//! - Esophagus → Stomach (boli), Stomach → Intestines (chyme)
//! - Liver → Gallbladder (bile), Gallbladder/Pancreas → Intestines
//! - Kidneys → Bladder (urine)
//! - Brain → Heart/Lungs (rate set-points)
//!
//! Collaborators are passed to `update` as `Option`s; an absent collaborator
//! falls back to a stable default instead of failing.
//!
//! [`Blood`]: crate::state::Blood

pub mod bladder;
pub mod brain;
pub mod esophagus;
pub mod gallbladder;
pub mod heart;
pub mod intestines;
pub mod kidneys;
pub mod liver;
pub mod lungs;
pub mod pancreas;
pub mod spinal_cord;
pub mod spleen;
pub mod stomach;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

pub use bladder::{Bladder, BladderState};
pub use brain::{Brain, BrainRegion, GlasgowComaScale};
pub use esophagus::{Bolus, Esophagus, EsophagusState};
pub use gallbladder::{Gallbladder, GallbladderState};
pub use heart::{CardiacPhase, Chamber, ChamberState, Heart, Valve, ValveState};
pub use intestines::{IntestinalSegment, Intestines};
pub use kidneys::Kidneys;
pub use liver::Liver;
pub use lungs::{CapnographyPhase, LungLobe, Lungs, RespiratoryPhase, VentilationMode};
pub use pancreas::{DigestiveEnzymes, Pancreas};
pub use spinal_cord::{SpinalCord, SpinalTract, TractStatus};
pub use spleen::Spleen;
pub use stomach::{Stomach, StomachState};

/// Numeric organ identifier, unique within a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganId(pub u32);

impl fmt::Display for OrganId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of organ variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganKind {
    Heart,
    Lungs,
    Brain,
    Liver,
    Kidneys,
    Bladder,
    Stomach,
    Intestines,
    Gallbladder,
    Pancreas,
    Esophagus,
    Spleen,
    SpinalCord,
}

impl OrganKind {
    /// All variants in registration order
    pub const ALL: [OrganKind; 13] = [
        OrganKind::Heart,
        OrganKind::Lungs,
        OrganKind::Brain,
        OrganKind::Liver,
        OrganKind::Kidneys,
        OrganKind::Bladder,
        OrganKind::Stomach,
        OrganKind::Intestines,
        OrganKind::Gallbladder,
        OrganKind::Pancreas,
        OrganKind::Esophagus,
        OrganKind::Spleen,
        OrganKind::SpinalCord,
    ];

    /// Order in which organs are advanced within one tick.
    ///
    /// Autonomous organs first, then secretors before their consumers, then
    /// the excretory pair, then cardiopulmonary, and Brain last so it reads
    /// this tick's aortic pressure and blood gases. Changing this order
    /// changes simulation output.
    pub const UPDATE_ORDER: [OrganKind; 13] = [
        OrganKind::Spleen,
        OrganKind::SpinalCord,
        OrganKind::Liver,
        OrganKind::Gallbladder,
        OrganKind::Pancreas,
        OrganKind::Esophagus,
        OrganKind::Stomach,
        OrganKind::Intestines,
        OrganKind::Kidneys,
        OrganKind::Bladder,
        OrganKind::Heart,
        OrganKind::Lungs,
        OrganKind::Brain,
    ];

    /// Type name used in summaries and lookups
    pub fn name(self) -> &'static str {
        match self {
            OrganKind::Heart => "Heart",
            OrganKind::Lungs => "Lungs",
            OrganKind::Brain => "Brain",
            OrganKind::Liver => "Liver",
            OrganKind::Kidneys => "Kidneys",
            OrganKind::Bladder => "Bladder",
            OrganKind::Stomach => "Stomach",
            OrganKind::Intestines => "Intestines",
            OrganKind::Gallbladder => "Gallbladder",
            OrganKind::Pancreas => "Pancreas",
            OrganKind::Esophagus => "Esophagus",
            OrganKind::Spleen => "Spleen",
            OrganKind::SpinalCord => "SpinalCord",
        }
    }

    /// Default identifier assigned at patient initialization
    pub fn default_id(self) -> OrganId {
        let position = OrganKind::ALL
            .iter()
            .position(|&kind| kind == self)
            .unwrap_or(0);
        OrganId(position as u32 + 1)
    }
}

impl fmt::Display for OrganKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OrganKind {
    type Err = SimError;

    /// Case-insensitive; spaces and underscores are ignored ("spinal cord")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect();
        OrganKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| SimError::UnknownOrgan(s.to_string()))
    }
}

/// Capability shared by every organ variant
pub trait Organ {
    /// Identifier within the owning patient
    fn id(&self) -> OrganId;

    /// Variant tag
    fn kind(&self) -> OrganKind;

    /// Human-readable diagnostic dump (not a stable format)
    fn summary(&self) -> String;
}
