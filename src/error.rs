//! Error types for the metric sieve
//!
//! Only construction can fail: sifting, registering and listing samples are
//! total over their inputs.

use thiserror::Error;

/// Result type alias for sieve operations
pub type Result<T> = std::result::Result<T, SieveError>;

/// Main error type for sieve operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SieveError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed or rendered as JSON
    #[error("JSON error: {0}")]
    Json(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

impl SieveError {
    /// Shorthand for an [`SieveError::InvalidConfig`] error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SieveError::InvalidConfig(reason.into())
    }
}

impl From<serde_json::Error> for SieveError {
    fn from(err: serde_json::Error) -> Self {
        SieveError::Json(err.to_string())
    }
}

impl From<std::io::Error> for SieveError {
    fn from(err: std::io::Error) -> Self {
        SieveError::Io(err.to_string())
    }
}
