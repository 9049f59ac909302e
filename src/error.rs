//! Error types for the sampling engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Invalid temperature {0}: must be positive")]
    InvalidTemperature(f64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Algorithm {algorithm} is not defined for the {model} model")]
    UnsupportedAlgorithm {
        algorithm: &'static str,
        model: &'static str,
    },

    #[error("Malformed position row: {0}")]
    MalformedPosition(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Reject temperatures that would break `ΔE / T`.
pub(crate) fn check_temperature(temperature: f64) -> Result<f64> {
    if temperature > 0.0 {
        Ok(temperature)
    } else {
        // also catches NaN
        Err(SimError::InvalidTemperature(temperature))
    }
}
