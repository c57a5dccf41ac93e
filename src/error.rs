//! Error types for the fallible edges of the crate
//!
//! The simulation itself never fails; only parsing and validating
//! configuration can.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::Tuning`]
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("power-up weights must be non-negative and sum above zero")]
    InvalidWeights,

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("reward table must not be empty")]
    EmptyRewards,
}

/// Errors raised while loading [`crate::Settings`] or parsing a theme name
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown theme '{0}' (expected night, day or auto)")]
    UnknownTheme(String),
}
