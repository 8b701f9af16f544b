//! Spinal cord: descending motor and ascending sensory pathways.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{MeanReversion, NoiseSource};

const MOTOR_VELOCITY: MeanReversion = MeanReversion::random_walk(0.1, 70.0, 80.0);
const SENSORY_VELOCITY: MeanReversion = MeanReversion::random_walk(0.1, 60.0, 70.0);

/// Signal integrity of a tract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TractStatus {
    #[default]
    Normal,
    Impaired,
    Severed,
}

impl TractStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TractStatus::Normal => "Normal",
            TractStatus::Impaired => "Impaired",
            TractStatus::Severed => "Severed",
        }
    }
}

/// Which pathway an injury targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinalTract {
    /// Descending motor tract
    Motor,
    /// Ascending sensory tract
    Sensory,
}

/// One nerve pathway
#[derive(Debug, Clone, PartialEq)]
pub struct NerveTract {
    pub name: &'static str,
    pub status: TractStatus,
    /// Conduction velocity (m/s)
    pub conduction_velocity_m_per_s: f64,
}

#[derive(Debug, Clone)]
pub struct SpinalCord {
    id: OrganId,
    motor: NerveTract,
    sensory: NerveTract,
    reflex_arc_intact: bool,
}

impl SpinalCord {
    pub fn new(id: OrganId) -> Self {
        Self {
            id,
            motor: NerveTract {
                name: "Descending Motor Tract",
                status: TractStatus::Normal,
                conduction_velocity_m_per_s: 75.0,
            },
            sensory: NerveTract {
                name: "Ascending Sensory Tract",
                status: TractStatus::Normal,
                conduction_velocity_m_per_s: 65.0,
            },
            reflex_arc_intact: true,
        }
    }

    pub fn update(&mut self, noise: &mut NoiseSource, dt_sec: f64) {
        let v = self.motor.conduction_velocity_m_per_s;
        self.motor.conduction_velocity_m_per_s = MOTOR_VELOCITY.step(v, v, dt_sec, noise);
        let v = self.sensory.conduction_velocity_m_per_s;
        self.sensory.conduction_velocity_m_per_s = SENSORY_VELOCITY.step(v, v, dt_sec, noise);

        self.refresh_reflex_arc();
    }

    /// Injure or restore a tract. Takes effect on reflex integrity immediately.
    pub fn set_tract_status(&mut self, tract: SpinalTract, status: TractStatus) {
        let target = match tract {
            SpinalTract::Motor => &mut self.motor,
            SpinalTract::Sensory => &mut self.sensory,
        };
        if target.status != status {
            log::debug!("{} status {} -> {}", target.name, target.status.as_str(), status.as_str());
        }
        target.status = status;
        self.refresh_reflex_arc();
    }

    fn refresh_reflex_arc(&mut self) {
        self.reflex_arc_intact =
            self.motor.status == TractStatus::Normal && self.sensory.status == TractStatus::Normal;
    }

    pub fn motor_pathway_status(&self) -> TractStatus {
        self.motor.status
    }

    pub fn sensory_pathway_status(&self) -> TractStatus {
        self.sensory.status
    }

    pub fn motor_tract(&self) -> &NerveTract {
        &self.motor
    }

    pub fn sensory_tract(&self) -> &NerveTract {
        &self.sensory
    }

    pub fn is_reflex_arc_intact(&self) -> bool {
        self.reflex_arc_intact
    }
}

impl Organ for SpinalCord {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::SpinalCord
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Spinal Cord Summary ---");
        for (label, tract) in [("Motor", &self.motor), ("Sensory", &self.sensory)] {
            let _ = writeln!(
                s,
                "{} Pathway ({}): {} ({:.1} m/s)",
                label,
                tract.name,
                tract.status.as_str(),
                tract.conduction_velocity_m_per_s
            );
        }
        let _ = writeln!(
            s,
            "Reflex Arc Intact: {}",
            if self.reflex_arc_intact { "Yes" } else { "No" }
        );
        s
    }
}
