//! Bladder: micturition state machine.
//!
//! ```text
//! Filling --(> 80% capacity or pressure > threshold)--> Full
//! Full    --(dwell elapsed)---------------------------> Voiding
//! Voiding --(empty)-----------------------------------> Filling
//! ```
//!
//! Urine arriving while Voiding is discarded, not queued.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::config::RenalParameters;
use crate::error::{check_volume, Result};

/// Detrusor pressure at full capacity (cmH2O)
const PRESSURE_AT_CAPACITY_CMH2O: f64 = 60.0;

/// Fill fraction that marks the bladder Full
const FULL_FILL_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BladderState {
    Filling,
    Full,
    Voiding,
}

impl BladderState {
    pub fn as_str(self) -> &'static str {
        match self {
            BladderState::Filling => "Filling",
            BladderState::Full => "Full",
            BladderState::Voiding => "Voiding",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bladder {
    id: OrganId,
    state: BladderState,
    volume_mL: f64,
    pressure_cmH2O: f64,
    internal_sphincter_closed: bool,
    time_in_full_sec: f64,

    capacity_mL: f64,
    full_pressure_cmH2O: f64,
    full_dwell_sec: f64,
    voiding_rate_mL_per_sec: f64,
}

impl Bladder {
    pub fn new(id: OrganId, params: &RenalParameters) -> Self {
        let mut bladder = Self {
            id,
            state: BladderState::Filling,
            volume_mL: 50.0,
            pressure_cmH2O: 0.0,
            internal_sphincter_closed: true,
            time_in_full_sec: 0.0,
            capacity_mL: params.bladder_capacity_mL,
            full_pressure_cmH2O: params.bladder_full_pressure_cmH2O,
            full_dwell_sec: params.bladder_full_dwell_sec,
            voiding_rate_mL_per_sec: params.bladder_voiding_rate_mL_per_sec,
        };
        bladder.refresh_pressure();
        bladder
    }

    pub fn update(&mut self, dt_sec: f64) {
        self.refresh_pressure();

        match self.state {
            BladderState::Filling => {
                if self.volume_mL > self.capacity_mL * FULL_FILL_FRACTION
                    || self.pressure_cmH2O > self.full_pressure_cmH2O
                {
                    self.transition(BladderState::Full);
                    self.time_in_full_sec = 0.0;
                }
            }
            BladderState::Full => {
                self.time_in_full_sec += dt_sec;
                if self.time_in_full_sec >= self.full_dwell_sec {
                    self.transition(BladderState::Voiding);
                    self.internal_sphincter_closed = false;
                    self.time_in_full_sec = 0.0;
                }
            }
            BladderState::Voiding => {
                self.volume_mL -= self.voiding_rate_mL_per_sec * dt_sec;
                if self.volume_mL <= 0.0 {
                    self.volume_mL = 0.0;
                    self.transition(BladderState::Filling);
                    self.internal_sphincter_closed = true;
                }
                self.refresh_pressure();
            }
        }
    }

    /// Externally add urine. Rejects negative or non-finite volumes.
    ///
    /// Has no effect while Voiding; the volume is clamped to capacity.
    pub fn add_urine(&mut self, volume_mL: f64) -> Result<()> {
        match check_volume("volume_mL", volume_mL) {
            Ok(volume) => {
                self.receive_urine(volume);
                Ok(())
            }
            Err(e) => {
                log::warn!("Bladder rejected urine: {}", e);
                Err(e)
            }
        }
    }

    /// Kidney handoff; same semantics as [`Bladder::add_urine`] for valid input
    pub(crate) fn receive_urine(&mut self, volume_mL: f64) {
        if self.state == BladderState::Voiding {
            return;
        }
        self.volume_mL = (self.volume_mL + volume_mL.max(0.0)).clamp(0.0, self.capacity_mL);
    }

    fn refresh_pressure(&mut self) {
        self.pressure_cmH2O = self.volume_mL / self.capacity_mL * PRESSURE_AT_CAPACITY_CMH2O;
    }

    fn transition(&mut self, next: BladderState) {
        log::debug!("Bladder: {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
    }

    pub fn state(&self) -> BladderState {
        self.state
    }

    pub fn volume(&self) -> f64 {
        self.volume_mL
    }

    pub fn pressure(&self) -> f64 {
        self.pressure_cmH2O
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_mL
    }

    pub fn is_internal_sphincter_closed(&self) -> bool {
        self.internal_sphincter_closed
    }
}

impl Organ for Bladder {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Bladder
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Bladder Summary ---");
        let _ = writeln!(s, "State: {}", self.state.as_str());
        let _ = writeln!(s, "Volume: {:.1} / {:.1} mL", self.volume_mL, self.capacity_mL);
        let _ = writeln!(s, "Pressure: {:.1} cmH2O", self.pressure_cmH2O);
        let _ = writeln!(
            s,
            "Internal Sphincter: {}",
            if self.internal_sphincter_closed { "Closed" } else { "Open" }
        );
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bladder() -> Bladder {
        Bladder::new(OrganId(6), &RenalParameters::default())
    }

    #[test]
    fn test_initial_state() {
        let b = bladder();
        assert_eq!(b.state(), BladderState::Filling);
        assert_eq!(b.volume(), 50.0);
        assert!((b.pressure() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_urine_caps_at_capacity() {
        let mut b = bladder();
        for _ in 0..500 {
            b.add_urine(1.0).unwrap();
            assert!(b.volume() <= 500.0);
        }
        assert_eq!(b.volume(), 500.0);
    }

    #[test]
    fn test_add_urine_rejects_invalid() {
        let mut b = bladder();
        assert!(b.add_urine(-1.0).is_err());
        assert!(b.add_urine(f64::NAN).is_err());
        assert_eq!(b.volume(), 50.0);
    }

    #[test]
    fn test_full_cycle() {
        let mut b = bladder();
        b.add_urine(360.0).unwrap();
        b.update(1.0);
        assert_eq!(b.state(), BladderState::Full);

        for _ in 0..10 {
            b.update(1.0);
        }
        assert_eq!(b.state(), BladderState::Voiding);
        assert!(!b.is_internal_sphincter_closed());

        // Urine arriving mid-void is dropped
        let before = b.volume();
        b.add_urine(25.0).unwrap();
        assert_eq!(b.volume(), before);

        for _ in 0..40 {
            b.update(1.0);
        }
        assert_eq!(b.state(), BladderState::Filling);
        assert_eq!(b.volume(), 0.0);
        assert!(b.is_internal_sphincter_closed());

        b.add_urine(25.0).unwrap();
        assert_eq!(b.volume(), 25.0);
    }
}
