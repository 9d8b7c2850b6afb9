//! Exchange rate records and the tenant metadata that governs their use.

use ratematch_common::{Currency, TenantId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_factor() -> u32 {
    1
}

/// An exchange rate record as supplied by the data provider.
///
/// A direct record converts `A` units of `from_currency` into
/// `A * value * to_currency_factor / from_currency_factor` units of
/// `to_currency`; an indirect record divides by `value` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Tenant owning the record.
    pub tenant_id: TenantId,
    /// Market data provider code.
    pub data_provider_code: String,
    /// Source within the provider.
    pub data_source: String,
    /// Rate type, e.g. `M` for average rate.
    pub rate_type: String,
    /// Currency converted from.
    pub from_currency: Currency,
    /// Currency converted to.
    pub to_currency: Currency,
    /// First instant the record applies.
    pub valid_from: Timestamp,
    /// Quoted rate value.
    pub value: Decimal,
    /// Whether `value` is quoted as to-per-from (direct) or from-per-to.
    #[serde(default)]
    pub is_indirect: bool,
    /// Units of `from_currency` the quote refers to.
    #[serde(default = "default_factor")]
    pub from_currency_factor: u32,
    /// Units of `to_currency` the quote refers to.
    #[serde(default = "default_factor")]
    pub to_currency_factor: u32,
}

impl ExchangeRate {
    /// Create a direct rate with unit factors and no provider/source.
    pub fn new(
        tenant_id: TenantId,
        rate_type: impl Into<String>,
        from_currency: Currency,
        to_currency: Currency,
        value: Decimal,
        valid_from: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            data_provider_code: String::new(),
            data_source: String::new(),
            rate_type: rate_type.into(),
            from_currency,
            to_currency,
            valid_from,
            value,
            is_indirect: false,
            from_currency_factor: 1,
            to_currency_factor: 1,
        }
    }

    /// Set data provider code and data source.
    pub fn with_source(
        mut self,
        data_provider_code: impl Into<String>,
        data_source: impl Into<String>,
    ) -> Self {
        self.data_provider_code = data_provider_code.into();
        self.data_source = data_source.into();
        self
    }

    /// Quote the value as indirect.
    pub fn indirect(mut self) -> Self {
        self.is_indirect = true;
        self
    }

    /// Set currency factors.
    pub fn with_factors(mut self, from_factor: u32, to_factor: u32) -> Self {
        self.from_currency_factor = from_factor;
        self.to_currency_factor = to_factor;
        self
    }

    /// Check whether this record quotes the given pair.
    pub fn quotes(&self, from: &Currency, to: &Currency) -> bool {
        self.from_currency == *from && self.to_currency == *to
    }

    /// The same quote read in the opposite direction.
    ///
    /// Swapping the currencies and factors and flipping the orientation
    /// yields a record that converts `to -> from` with the original value.
    pub fn inverted(&self) -> Self {
        Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            is_indirect: !self.is_indirect,
            from_currency_factor: self.to_currency_factor,
            to_currency_factor: self.from_currency_factor,
            ..self.clone()
        }
    }

    /// Check whether any factor is zero.
    pub fn has_zero_factor(&self) -> bool {
        self.from_currency_factor == 0 || self.to_currency_factor == 0
    }
}

/// Tenant-level defaults restricting which provider and source are used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Market data provider code.
    pub data_provider_code: String,
    /// Source within the provider.
    pub data_source: String,
}

impl TenantSettings {
    /// Create tenant settings.
    pub fn new(data_provider_code: impl Into<String>, data_source: impl Into<String>) -> Self {
        Self {
            data_provider_code: data_provider_code.into(),
            data_source: data_source.into(),
        }
    }

    /// Check if a rate comes from the configured provider and source.
    pub fn matches(&self, rate: &ExchangeRate) -> bool {
        rate.data_provider_code == self.data_provider_code && rate.data_source == self.data_source
    }
}

/// Per-rate-type metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTypeDetail {
    /// Currency used to triangulate pairs without a direct quote.
    #[serde(default)]
    pub reference_currency: Option<Currency>,
    /// Whether a quote may be read in the opposite direction.
    #[serde(default)]
    pub is_inversion_allowed: bool,
}

impl RateTypeDetail {
    /// Create rate type metadata.
    pub fn new(reference_currency: Option<Currency>, is_inversion_allowed: bool) -> Self {
        Self {
            reference_currency,
            is_inversion_allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample() -> ExchangeRate {
        ExchangeRate::new(
            TenantId::new("acme"),
            "M",
            Currency::jpy(),
            Currency::usd(),
            dec!(0.9),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_source("ECB", "WEB")
        .with_factors(100, 1)
    }

    #[test]
    fn test_inverted_swaps_everything() {
        let rate = sample();
        let inverted = rate.inverted();

        assert!(inverted.quotes(&Currency::usd(), &Currency::jpy()));
        assert!(inverted.is_indirect);
        assert_eq!(inverted.from_currency_factor, 1);
        assert_eq!(inverted.to_currency_factor, 100);
        assert_eq!(inverted.value, rate.value);
        assert_eq!(inverted.inverted(), rate);
    }

    #[test]
    fn test_tenant_settings_match() {
        let rate = sample();
        assert!(TenantSettings::new("ECB", "WEB").matches(&rate));
        assert!(!TenantSettings::new("ECB", "API").matches(&rate));
        assert!(!TenantSettings::new("FED", "WEB").matches(&rate));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{
            "tenant_id": "acme",
            "data_provider_code": "ECB",
            "data_source": "WEB",
            "rate_type": "M",
            "from_currency": "usd",
            "to_currency": "eur",
            "valid_from": "2024-01-01T00:00:00Z",
            "value": "0.92"
        }"#;
        let rate: ExchangeRate = serde_json::from_str(json).unwrap();

        assert_eq!(rate.from_currency, Currency::usd());
        assert_eq!(rate.value, dec!(0.92));
        assert!(!rate.is_indirect);
        assert_eq!(rate.from_currency_factor, 1);
        assert_eq!(rate.to_currency_factor, 1);
    }
}
