//! Currency conversion request and result types.

use bigdecimal::BigDecimal;
use ratematch_common::{parse_decimal, Currency, RequestId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FxResult;
use crate::rate::ExchangeRate;

/// Request to convert an amount using the rate valid at `as_of`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Key of this request in batch results.
    #[serde(default)]
    pub id: RequestId,
    /// Currency converted from.
    pub from_currency: Currency,
    /// Currency converted to.
    pub to_currency: Currency,
    /// Amount to convert.
    pub amount: Decimal,
    /// Rate type to resolve.
    pub rate_type: String,
    /// Point in time the rate must be valid for.
    pub as_of: Timestamp,
}

impl ConversionRequest {
    /// Create a new conversion request.
    pub fn new(
        from_currency: Currency,
        to_currency: Currency,
        amount: Decimal,
        rate_type: impl Into<String>,
        as_of: Timestamp,
    ) -> Self {
        Self {
            id: RequestId::new(),
            from_currency,
            to_currency,
            amount,
            rate_type: rate_type.into(),
            as_of,
        }
    }

    /// Create from a decimal string amount.
    pub fn from_str_amount(
        from_currency: Currency,
        to_currency: Currency,
        amount: &str,
        rate_type: impl Into<String>,
        as_of: Timestamp,
    ) -> FxResult<Self> {
        let amount = parse_decimal(amount)?;
        Ok(Self::new(from_currency, to_currency, amount, rate_type, as_of))
    }

    /// Whether source and target currency are the same.
    pub fn is_same_currency(&self) -> bool {
        self.from_currency == self.to_currency
    }
}

/// How the applied rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Source and target currency are equal; rate 1.
    SameCurrency,
    /// Record quoting the requested pair.
    Direct,
    /// Record quoting the reversed pair, read backwards.
    Inverted,
    /// Two legs through the rate type's reference currency.
    ReferenceCurrency,
    /// Rate supplied by the caller.
    FixedRate,
}

/// Result of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Request this result belongs to.
    pub request_id: RequestId,
    /// Rate applied, possibly synthetic.
    pub resolved_rate: ExchangeRate,
    /// How `resolved_rate` was obtained.
    pub strategy: ResolutionStrategy,
    /// Exact converted amount, before rounding.
    pub converted_amount: BigDecimal,
    /// Converted amount rounded to the target currency's fraction digits.
    pub rounded_amount: BigDecimal,
}

/// Builder for conversion requests.
pub struct ConversionRequestBuilder {
    from_currency: Option<Currency>,
    to_currency: Option<Currency>,
    amount: Option<Decimal>,
    rate_type: Option<String>,
    as_of: Option<Timestamp>,
}

impl ConversionRequestBuilder {
    /// Create a new request builder.
    pub fn new() -> Self {
        Self {
            from_currency: None,
            to_currency: None,
            amount: None,
            rate_type: None,
            as_of: None,
        }
    }

    /// Set the amount and its currency.
    pub fn amount(mut self, amount: Decimal, currency: Currency) -> Self {
        self.amount = Some(amount);
        self.from_currency = Some(currency);
        self
    }

    /// Set the target currency.
    pub fn to(mut self, currency: Currency) -> Self {
        self.to_currency = Some(currency);
        self
    }

    /// Set the rate type.
    pub fn rate_type(mut self, rate_type: impl Into<String>) -> Self {
        self.rate_type = Some(rate_type.into());
        self
    }

    /// Set the validity date; defaults to now.
    pub fn as_of(mut self, as_of: Timestamp) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Build the conversion request.
    pub fn build(self) -> Option<ConversionRequest> {
        Some(ConversionRequest::new(
            self.from_currency?,
            self.to_currency?,
            self.amount?,
            self.rate_type?,
            self.as_of.unwrap_or_else(ratematch_common::now),
        ))
    }
}

impl Default for ConversionRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
