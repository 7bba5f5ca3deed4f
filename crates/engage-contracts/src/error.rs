//! Error types for the engagement dashboard.
//!
//! All fallible operations return `EngageResult<T>`. Outcomes the user is
//! expected to recover from (a rejected login, a restricted view) are modelled
//! as ordinary return values elsewhere and never appear here.

use thiserror::Error;

/// The unified error type for the engagement dashboard crates.
#[derive(Debug, Error)]
pub enum EngageError {
    /// The dataset source could not be read (I/O, network, bad status, timeout).
    ///
    /// Never fatal to the dashboard: the loader falls back to generated data.
    #[error("dataset load failed: {reason}")]
    DatasetLoad { reason: String },

    /// The dataset was read but its contents could not be accepted.
    #[error("dataset rejected: {reason}")]
    DatasetInvalid { reason: String },

    /// A filter value is neither `all` nor a member of the field's domain.
    #[error("invalid value '{value}' for filter '{field}'")]
    InvalidFilter { field: String, value: String },

    /// The dashboard state machine was asked for an illegal transition.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// The session store could not persist or clear the current user.
    #[error("session store error: {reason}")]
    SessionStore { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A JSON Schema document could not be compiled or applied.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the engagement crates.
pub type EngageResult<T> = Result<T, EngageError>;
