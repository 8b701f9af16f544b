//! Esophagus: peristaltic transport of swallowed boli into the stomach.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Organ, OrganId, OrganKind, Stomach};
use crate::config::DigestiveParameters;
use crate::dynamics::{MeanReversion, NoiseSource};
use crate::error::{check_volume, Result};

const MOTILITY: MeanReversion = MeanReversion::random_walk(0.001, 0.95, 1.05);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EsophagusState {
    Idle,
    Contracting,
}

impl EsophagusState {
    pub fn as_str(self) -> &'static str {
        match self {
            EsophagusState::Idle => "Idle",
            EsophagusState::Contracting => "Contracting",
        }
    }
}

/// Swallowed portion in transit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bolus {
    pub volume_mL: f64,
    /// Distance travelled from the pharynx (cm)
    pub position_cm: f64,
}

#[derive(Debug, Clone)]
pub struct Esophagus {
    id: OrganId,
    state: EsophagusState,
    motility: f64,
    boli: Vec<Bolus>,
    length_cm: f64,
    peristaltic_speed_cm_per_sec: f64,
}

impl Esophagus {
    pub fn new(id: OrganId, params: &DigestiveParameters) -> Self {
        Self {
            id,
            state: EsophagusState::Idle,
            motility: 1.0,
            boli: Vec::new(),
            length_cm: params.esophagus_length_cm,
            peristaltic_speed_cm_per_sec: params.peristaltic_speed_cm_per_sec,
        }
    }

    /// Advance every bolus; those reaching the end are delivered to the stomach
    pub fn update(&mut self, noise: &mut NoiseSource, dt_sec: f64, mut stomach: Option<&mut Stomach>) {
        let dt = dt_sec.max(0.0);
        self.motility = MOTILITY.step(self.motility, self.motility, dt, noise);

        let advance = self.peristaltic_speed_cm_per_sec * self.motility * dt;
        for bolus in &mut self.boli {
            bolus.position_cm += advance;
        }

        let length = self.length_cm;
        let (arrived, in_transit): (Vec<Bolus>, Vec<Bolus>) =
            self.boli.drain(..).partition(|b| b.position_cm >= length);
        self.boli = in_transit;

        for bolus in arrived {
            match stomach.as_deref_mut() {
                Some(stomach) => {
                    log::debug!("Esophagus: delivered {:.1} mL bolus", bolus.volume_mL);
                    stomach.receive_bolus(bolus.volume_mL);
                }
                None => log::warn!(
                    "Esophagus: {:.1} mL bolus lost, no stomach present",
                    bolus.volume_mL
                ),
            }
        }

        self.state = if self.boli.is_empty() {
            EsophagusState::Idle
        } else {
            EsophagusState::Contracting
        };
    }

    /// Start a swallow. Rejects negative or non-finite volumes.
    pub fn initiate_swallow(&mut self, volume_mL: f64) -> Result<()> {
        let volume = check_volume("volume_mL", volume_mL).map_err(|e| {
            log::warn!("Esophagus rejected swallow: {}", e);
            e
        })?;
        self.boli.push(Bolus {
            volume_mL: volume,
            position_cm: 0.0,
        });
        self.state = EsophagusState::Contracting;
        Ok(())
    }

    pub fn state(&self) -> EsophagusState {
        self.state
    }

    pub fn motility(&self) -> f64 {
        self.motility
    }

    pub fn boli(&self) -> &[Bolus] {
        &self.boli
    }

    /// Time for a bolus to traverse the esophagus at current motility (s)
    pub fn transit_time(&self) -> f64 {
        self.length_cm / (self.peristaltic_speed_cm_per_sec * self.motility)
    }
}

impl Organ for Esophagus {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Esophagus
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Esophagus Summary ---");
        let _ = writeln!(s, "State: {}", self.state.as_str());
        let _ = writeln!(s, "Motility: {:.1}%", self.motility * 100.0);
        let _ = writeln!(s, "Boli in Transit: {}", self.boli.len());
        for bolus in &self.boli {
            let _ = writeln!(
                s,
                " {:.1} mL at {:.1} / {:.1} cm",
                bolus.volume_mL, bolus.position_cm, self.length_cm
            );
        }
        s
    }
}
