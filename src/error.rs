//! Error types for the simulator.
//!
//! Only input validation can fail. A missing collaborator organ is not an
//! error (organs fall back to stable defaults) and numeric drift is prevented
//! by clamping, so neither appears here.

/// Result type alias using [`SimError`]
pub type Result<T> = std::result::Result<T, SimError>;

/// Core error type for simulator operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Construction or trigger input outside its accepted domain
    #[error("invalid {field} = {value}: {reason}")]
    InvalidInput {
        /// Name of the offending argument or parameter
        field: &'static str,
        /// Value that was rejected
        value: f64,
        /// Human readable constraint
        reason: &'static str,
    },

    /// Organ type name that matches no organ variant
    #[error("unknown organ type: {0}")]
    UnknownOrgan(String),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        SimError::InvalidInput { field, value, reason }
    }
}

/// Validate a volume supplied to an externally triggered action.
///
/// Accepts finite, non-negative values only.
pub(crate) fn check_volume(field: &'static str, volume_mL: f64) -> Result<f64> {
    if !volume_mL.is_finite() {
        return Err(SimError::invalid(field, volume_mL, "must be finite"));
    }
    if volume_mL < 0.0 {
        return Err(SimError::invalid(field, volume_mL, "must be non-negative"));
    }
    Ok(volume_mL)
}
