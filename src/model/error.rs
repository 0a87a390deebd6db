//! Error types for listkit.
//!
//! The list core itself is fail-soft: index, key and operation-id lookups
//! return `Option`/`bool` and stale completions are dropped silently. Errors
//! exist only at the boundaries where external data enters the crate.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error of the replay binary
//!   - [`DiffError`] - Malformed diff payload handed to the adapter
//!   - [`ConfigError`](crate::config::loader::ConfigError) - Config file failures
//!   - [`LoggingError`](crate::logging::LoggingError) - Log sink set-up failures
//!   - `std::io::Error` - Scenario file reading failures

use crate::config::loader::ConfigError;
use crate::logging::LoggingError;
use thiserror::Error;

/// Top-level error of the replay binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// A diff payload was rejected.
    #[error("Invalid diff payload: {0}")]
    Diff(#[from] DiffError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The scenario file could not be parsed.
    #[error("Invalid scenario: {0}")]
    Scenario(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a diff payload is rejected before it touches adapter state.
///
/// A rejected payload leaves the adapter exactly as it was; the caller may
/// retry with a corrected payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// The payload is not valid JSON or does not match the expected shape.
    #[error("Malformed diff JSON: {0}")]
    Json(String),

    /// `updateFrom` and `updateTo` must pair up one to one.
    #[error("updateFrom has {from} entries but updateTo has {to}")]
    UpdatePairMismatch {
        /// Length of `updateFrom`.
        from: usize,
        /// Length of `updateTo`.
        to: usize,
    },

    /// Item keys must be unique within one data snapshot.
    #[error("Duplicate item key {0:?}")]
    DuplicateKey(String),

    /// An index list refers past the end of the sequence it indexes.
    #[error("{field} index {index} is out of range (len {len})")]
    IndexOutOfRange {
        /// Payload field holding the bad index.
        field: &'static str,
        /// The offending index.
        index: usize,
        /// Length of the sequence the field indexes.
        len: usize,
    },
}

impl From<serde_json::Error> for DiffError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}
