//! Patient Simulator X - discrete-time multi-organ physiology
//!
//! A shared blood record is read and written once per tick by thirteen
//! organ models, closing homeostatic loops between the cardiopulmonary,
//! renal, hepatic, digestive and neurological systems.

// Allow non-snake-case for unit suffixes in field names (mL, mmHg, cmH2O, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod config;
pub mod dynamics;
pub mod error;
pub mod organs;
pub mod patient;
pub mod state;

pub use config::Parameters;
pub use dynamics::{MeanReversion, NoiseSource};
pub use error::{Result, SimError};
pub use organs::{Organ, OrganId, OrganKind};
pub use patient::{
    get_lab_summary, get_organ_summary, get_patient_summary, initialize_patient,
    initialize_patient_with_leads, update_patient, OrganSet, Patient, RegisteredOrgan,
};
pub use state::{AcidBaseStatus, Blood, BloodPressure, LabPanel, VitalSigns, VitalStatus};

/// Body mass index (kg/m²).
///
/// Both inputs must be finite and strictly positive.
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> Result<f64> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(SimError::invalid("weight_kg", weight_kg, "must be positive"));
    }
    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(SimError::invalid("height_m", height_m, "must be positive"));
    }
    Ok(weight_kg / (height_m * height_m))
}
