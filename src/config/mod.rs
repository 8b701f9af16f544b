//! Configuration module for loading simulation parameters.
//!
//! Parameters cover the simulation harness (EKG leads, waveform history,
//! RNG seed) and the tunable capacities and timings of the digestive and
//! renal state machines.

mod parameters;

pub use parameters::{DigestiveParameters, Parameters, RenalParameters, SimulationParameters};
