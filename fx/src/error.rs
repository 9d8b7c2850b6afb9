//! Conversion error types.

use chrono::{DateTime, Utc};
use ratematch_common::{CommonError, Currency};
use thiserror::Error;

/// Errors that can occur while resolving a rate or converting an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Request list is empty or oversized, or a request is malformed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// No tenant was supplied for the conversion.
    #[error("Tenant must not be empty")]
    MissingTenant,

    /// The data provider returned no exchange rates at all.
    #[error("Exchange rate list is empty")]
    EmptyExchangeRateList,

    /// No strategy produced a usable rate for the pair.
    #[error("No matching exchange rate record for {from}/{to} with rate type {rate_type}")]
    NoMatchingExchangeRateRecord {
        from: Currency,
        to: Currency,
        rate_type: String,
    },

    /// More than one record shares the latest validity date for the pair.
    #[error("Ambiguous exchange rate records for {from}/{to} valid from {valid_from}")]
    AmbiguousExchangeRateRecord {
        from: Currency,
        to: Currency,
        valid_from: DateTime<Utc>,
    },

    /// A currency factor or an indirect rate value would divide by zero.
    #[error("Zero currency factor in rate {from}/{to}")]
    ZeroCurrencyFactor { from: Currency, to: Currency },

    /// Currency is not present in the registry.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Amount or rate is not a valid decimal.
    #[error("Invalid decimal value '{0}'")]
    InvalidDecimal(String),

    /// A synthetic rate value does not fit into a decimal.
    #[error("Arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),

    /// Data provider returned an error.
    #[error("Data provider error: {0}")]
    ProviderFailure(String),

    /// Batch evaluation was aborted before producing results.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Get error code for serialized results.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConversionError::InvalidParameters(_) => "INVALID_PARAMETERS",
            ConversionError::MissingTenant => "MISSING_TENANT",
            ConversionError::EmptyExchangeRateList => "EMPTY_EXCHANGE_RATE_LIST",
            ConversionError::NoMatchingExchangeRateRecord { .. } => {
                "NO_MATCHING_EXCHANGE_RATE_RECORD"
            }
            ConversionError::AmbiguousExchangeRateRecord { .. } => {
                "AMBIGUOUS_EXCHANGE_RATE_RECORD"
            }
            ConversionError::ZeroCurrencyFactor { .. } => "ZERO_CURRENCY_FACTOR",
            ConversionError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            ConversionError::InvalidDecimal(_) => "INVALID_DECIMAL",
            ConversionError::ArithmeticOverflow(_) => "ARITHMETIC_OVERFLOW",
            ConversionError::ProviderFailure(_) => "PROVIDER_FAILURE",
            ConversionError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors of this class fail a whole batch instead of a single entry.
    pub fn is_batch_level(&self) -> bool {
        matches!(
            self,
            ConversionError::InvalidParameters(_)
                | ConversionError::MissingTenant
                | ConversionError::ProviderFailure(_)
                | ConversionError::Internal(_)
        )
    }

    /// Attach the rate's currency pair to a zero-denominator error.
    pub(crate) fn zero_factor(from: &Currency, to: &Currency) -> Self {
        ConversionError::ZeroCurrencyFactor {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

impl From<CommonError> for ConversionError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::UnknownCurrency(code) => ConversionError::UnknownCurrency(code),
            CommonError::InvalidDecimal { value, .. } => ConversionError::InvalidDecimal(value),
        }
    }
}

/// Result type for conversion operations.
pub type FxResult<T> = Result<T, ConversionError>;
