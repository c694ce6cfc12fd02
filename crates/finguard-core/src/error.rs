//! Error types for FinGuard.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type alias using `FinGuardError`.
pub type Result<T> = std::result::Result<T, FinGuardError>;

/// Errors that can occur in the risk engine.
///
/// Missing transaction or profile fields are deliberately not represented
/// here: the scoring path substitutes documented defaults (amount 0, text
/// fields "Unknown") and stays total over malformed input.
#[derive(Debug, Error)]
pub enum FinGuardError {
    /// A timestamp could not be parsed. The affected time-based rule is
    /// skipped for that entry; this error never fails a scoring request.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A safety restriction rejected the operation: a cooling-off period is
    /// active and has not elapsed.
    #[error("Cooling-off active until {until}; feedback rejected")]
    CoolingOffActive {
        /// When the cooling-off period ends.
        until: NaiveDateTime,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinGuardError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        FinGuardError::Config(msg.into())
    }

    /// Create an invalid-timestamp error.
    #[must_use]
    pub fn invalid_timestamp(raw: impl Into<String>) -> Self {
        FinGuardError::InvalidTimestamp(raw.into())
    }

    /// Returns true if this is a safety restriction the caller can surface
    /// to the user as a rejection reason rather than a failure.
    #[must_use]
    pub fn is_safety_restriction(&self) -> bool {
        matches!(self, FinGuardError::CoolingOffActive { .. })
    }
}
