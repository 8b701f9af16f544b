//! Stomach: gastric state machine.
//!
//! ```text
//! Empty --add_substance--> Filling --dwell--> Digesting --duration--> Emptying
//!   ^                                                                     |
//!   +-------------------------------(volume reaches 0)--------------------+
//! ```
//!
//! Adding food from any state restarts Filling. Digesting secretes acid and
//! lowers pH linearly; Emptying delivers chyme into the intestines.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Intestines, Organ, OrganId, OrganKind};
use crate::config::DigestiveParameters;
use crate::error::{check_volume, Result};

/// pH of an empty stomach
pub const RESTING_PH: f64 = 4.5;
/// Ceiling pH after food buffers the acid
const BUFFERED_PH_CEILING: f64 = 4.0;
const MIN_PH: f64 = 1.5;
/// Acid secretion while digesting (pH units/s)
const ACIDIFICATION_PER_SEC: f64 = 0.5;

const BASAL_SECRETION_ML_PER_SEC: f64 = 0.1;
const DIGESTIVE_SECRETION_ML_PER_SEC: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StomachState {
    Empty,
    Filling,
    Digesting,
    Emptying,
}

impl StomachState {
    pub fn as_str(self) -> &'static str {
        match self {
            StomachState::Empty => "Empty",
            StomachState::Filling => "Filling",
            StomachState::Digesting => "Digesting",
            StomachState::Emptying => "Emptying",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stomach {
    id: OrganId,
    state: StomachState,
    volume_mL: f64,
    ph: f64,
    fill_time_sec: f64,
    digest_time_sec: f64,

    capacity_mL: f64,
    filling_dwell_sec: f64,
    digesting_duration_sec: f64,
    emptying_rate_mL_per_sec: f64,
}

impl Stomach {
    pub fn new(id: OrganId, params: &DigestiveParameters) -> Self {
        Self {
            id,
            state: StomachState::Empty,
            volume_mL: 0.0,
            ph: RESTING_PH,
            fill_time_sec: 0.0,
            digest_time_sec: 0.0,
            capacity_mL: params.stomach_capacity_mL,
            filling_dwell_sec: params.stomach_filling_dwell_sec,
            digesting_duration_sec: params.stomach_digesting_duration_sec,
            emptying_rate_mL_per_sec: params.stomach_emptying_rate_mL_per_sec,
        }
    }

    /// Advance one tick, passing chyme to the intestines while Emptying
    pub fn update(&mut self, dt_sec: f64, intestines: Option<&mut Intestines>) {
        let dt = dt_sec.max(0.0);

        match self.state {
            StomachState::Empty => {}
            StomachState::Filling => {
                self.fill_time_sec += dt;
                if self.fill_time_sec >= self.filling_dwell_sec {
                    self.fill_time_sec = 0.0;
                    self.transition(StomachState::Digesting);
                }
            }
            StomachState::Digesting => {
                self.ph = (self.ph - ACIDIFICATION_PER_SEC * dt).max(MIN_PH);
                self.digest_time_sec += dt;
                if self.digest_time_sec >= self.digesting_duration_sec {
                    self.digest_time_sec = 0.0;
                    self.transition(StomachState::Emptying);
                }
            }
            StomachState::Emptying => {
                let chyme = (self.emptying_rate_mL_per_sec * dt).min(self.volume_mL);
                match intestines {
                    Some(intestines) => intestines.receive_chyme(chyme),
                    None if chyme > 0.0 => {
                        log::warn!("Stomach emptied {:.2} mL with no intestines present", chyme)
                    }
                    None => {}
                }
                self.volume_mL -= chyme;
                if self.volume_mL <= 0.0 {
                    self.volume_mL = 0.0;
                    self.ph = RESTING_PH;
                    self.transition(StomachState::Empty);
                }
            }
        }

        if self.state != StomachState::Empty {
            let secretion = if self.state == StomachState::Digesting {
                DIGESTIVE_SECRETION_ML_PER_SEC
            } else {
                BASAL_SECRETION_ML_PER_SEC
            };
            self.volume_mL = (self.volume_mL + secretion * dt).clamp(0.0, self.capacity_mL);
        }
    }

    /// Externally add food or fluid. Rejects negative or non-finite volumes.
    pub fn add_substance(&mut self, volume_mL: f64) -> Result<()> {
        let volume = check_volume("volume_mL", volume_mL).map_err(|e| {
            log::warn!("Stomach rejected substance: {}", e);
            e
        })?;
        self.receive_bolus(volume);
        Ok(())
    }

    /// Esophageal handoff; restarts Filling from any state
    pub(crate) fn receive_bolus(&mut self, volume_mL: f64) {
        self.volume_mL = (self.volume_mL + volume_mL.max(0.0)).clamp(0.0, self.capacity_mL);
        self.ph = (self.ph + 0.5).min(BUFFERED_PH_CEILING);
        self.fill_time_sec = 0.0;
        self.digest_time_sec = 0.0;
        self.transition(StomachState::Filling);
    }

    fn transition(&mut self, next: StomachState) {
        if self.state != next {
            log::debug!("Stomach: {} -> {}", self.state.as_str(), next.as_str());
        }
        self.state = next;
    }

    pub fn state(&self) -> StomachState {
        self.state
    }

    pub fn volume(&self) -> f64 {
        self.volume_mL
    }

    pub fn acidity(&self) -> f64 {
        self.ph
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_mL
    }
}

impl Organ for Stomach {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Stomach
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Stomach Summary ---");
        let _ = writeln!(s, "State: {}", self.state.as_str());
        let _ = writeln!(s, "Volume: {:.1} / {:.1} mL", self.volume_mL, self.capacity_mL);
        let _ = writeln!(s, "Acidity (pH): {:.1}", self.ph);
        s
    }
}
