//! Engine error model.

use thiserror::Error;

/// Result type returned by every engine operation.
pub type AmortizationResult<T> = Result<T, AmortizationError>;

/// Engine-level error.
///
/// The engine is deterministic, so the only failure is an argument outside the
/// domain of the annuity model. Callers surface it unmodified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmortizationError {
    /// An input was out of range (non-positive principal, zero term, month
    /// outside the loan term, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl AmortizationError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
