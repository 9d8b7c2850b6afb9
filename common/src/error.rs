//! Error types shared by the ratematch crates.

use thiserror::Error;

/// Errors raised by the currency registry and decimal parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Currency code is not present in the registry.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// A string could not be parsed as an exact decimal.
    #[error("Invalid decimal value '{value}': {reason}")]
    InvalidDecimal { value: String, reason: String },
}

impl CommonError {
    /// Get error code for diagnostics and serialized results.
    pub fn error_code(&self) -> &'static str {
        match self {
            CommonError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            CommonError::InvalidDecimal { .. } => "INVALID_DECIMAL",
        }
    }
}

/// Result type alias for common operations.
pub type Result<T> = std::result::Result<T, CommonError>;
