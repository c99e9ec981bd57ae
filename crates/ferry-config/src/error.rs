//! Error types for transfer configuration.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration failures detected before any transfer work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Operation name was neither `copy` nor `move`.
    #[error("invalid operation")]
    InvalidOperation {
        /// Operation name provided by the caller.
        value: String,
    },
    /// Source specification did not yield a source directory.
    #[error("malformed source specification")]
    MalformedSource {
        /// Raw source specification provided by the caller.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Worker count was not a positive integer.
    #[error("invalid worker count")]
    InvalidWorkerCount {
        /// Worker count provided by the caller.
        value: usize,
    },
    /// Runtime setting could not be parsed.
    #[error("invalid runtime setting")]
    InvalidSetting {
        /// Name of the setting (environment variable or flag).
        name: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}
