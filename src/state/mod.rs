//! State shared across the simulation.
//!
//! Contains the blood record every organ reads and writes, the bounded
//! waveform buffers used for observable traces, the vital-sign snapshot and
//! the laboratory panels derived from the blood.

mod blood;
mod labs;
mod vitals;
mod waveform;

pub use blood::{bounds, Blood, BloodPressure, Range};
pub use labs::{
    henderson_hasselbalch_ph, pao2_from_saturation, AcidBaseStatus, ArterialBloodGas,
    CoagulationPanel, CompleteBloodCount, LabPanel, LabSources, MetabolicPanel, WbcDifferential,
};
pub use vitals::{normal_ranges, VitalReading, VitalSigns, VitalStatus};
pub use waveform::{WaveformBuffer, DEFAULT_WAVEFORM_CAPACITY};
