//! JSON fixtures: rates, tenant metadata and the requests to convert.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use ratematch_common::{parse_decimal, Currency, RequestId, TenantId, Timestamp};
use ratematch_fx::{
    BatchConversionResult, ConversionRequest, ConversionResult, EngineConfig, ExchangeRate,
    InMemoryDataProvider, RateTypeDetail, TenantSettings,
};
use serde::{Deserialize, Serialize};

/// A complete conversion scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Tenant the requests run for.
    pub tenant: String,
    /// Default provider/source settings of the tenant.
    #[serde(default)]
    pub tenant_settings: Option<TenantSettings>,
    /// Rate-type metadata keyed by rate type.
    #[serde(default)]
    pub rate_type_details: HashMap<String, RateTypeDetail>,
    /// Non-ISO currencies and their fraction digits.
    #[serde(default)]
    pub currencies: HashMap<String, u32>,
    #[serde(default)]
    pub rates: Vec<FixtureRate>,
    pub requests: Vec<FixtureRequest>,
}

/// A rate record. The tenant defaults to the fixture's tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRate {
    #[serde(default)]
    pub tenant: Option<String>,
    pub data_provider_code: String,
    pub data_source: String,
    pub rate_type: String,
    pub from_currency: String,
    pub to_currency: String,
    pub valid_from: Timestamp,
    pub value: String,
    #[serde(default)]
    pub is_indirect: bool,
    #[serde(default)]
    pub from_currency_factor: Option<u32>,
    #[serde(default)]
    pub to_currency_factor: Option<u32>,
}

/// A conversion request. `as_of` defaults to the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureRequest {
    #[serde(default)]
    pub id: Option<RequestId>,
    pub from_currency: String,
    pub to_currency: String,
    pub amount: String,
    pub rate_type: String,
    #[serde(default)]
    pub as_of: Option<Timestamp>,
}

impl Fixture {
    /// Read a fixture from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn tenant_id(&self) -> TenantId {
        TenantId::new(self.tenant.clone())
    }

    /// Register the fixture's custom currencies on top of `config`.
    pub fn apply_currencies(&self, config: EngineConfig) -> EngineConfig {
        self.currencies
            .iter()
            .fold(config, |config, (code, digits)| {
                config.with_currency(Currency::from(code.as_str()), *digits)
            })
    }

    /// Build an in-memory provider holding the fixture's data.
    pub fn provider(&self) -> anyhow::Result<InMemoryDataProvider> {
        let provider = InMemoryDataProvider::new("fixture");
        let tenant = self.tenant_id();

        for (index, rate) in self.rates.iter().enumerate() {
            let rate = rate
                .to_exchange_rate(&tenant)
                .with_context(|| format!("rate #{index}"))?;
            provider.add_rate(rate);
        }

        if let Some(settings) = &self.tenant_settings {
            provider.set_tenant_settings(tenant.clone(), settings.clone());
        }

        for (rate_type, detail) in &self.rate_type_details {
            provider.set_rate_type_detail(tenant.clone(), rate_type.clone(), detail.clone());
        }

        Ok(provider)
    }

    /// Conversion requests in fixture order.
    pub fn requests(&self, now: Timestamp) -> anyhow::Result<Vec<ConversionRequest>> {
        self.requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                request
                    .to_request(now)
                    .with_context(|| format!("request #{index}"))
            })
            .collect()
    }
}

impl FixtureRate {
    fn to_exchange_rate(&self, default_tenant: &TenantId) -> anyhow::Result<ExchangeRate> {
        let tenant = self
            .tenant
            .as_deref()
            .map_or_else(|| default_tenant.clone(), TenantId::new);
        let value = parse_decimal(&self.value)?;

        let mut rate = ExchangeRate::new(
            tenant,
            self.rate_type.clone(),
            Currency::from(self.from_currency.as_str()),
            Currency::from(self.to_currency.as_str()),
            value,
            self.valid_from,
        )
        .with_source(self.data_provider_code.clone(), self.data_source.clone())
        .with_factors(
            self.from_currency_factor.unwrap_or(1),
            self.to_currency_factor.unwrap_or(1),
        );
        if self.is_indirect {
            rate = rate.indirect();
        }
        Ok(rate)
    }
}

impl FixtureRequest {
    fn to_request(&self, now: Timestamp) -> anyhow::Result<ConversionRequest> {
        let mut request = ConversionRequest::from_str_amount(
            Currency::from(self.from_currency.as_str()),
            Currency::from(self.to_currency.as_str()),
            &self.amount,
            self.rate_type.clone(),
            self.as_of.unwrap_or(now),
        )?;
        if let Some(id) = self.id {
            request.id = id;
        }
        Ok(request)
    }
}

/// Outcome of one request as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct RequestOutput {
    pub request_id: RequestId,
    pub status: OutputStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConversionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub code: &'static str,
    pub message: String,
}

/// Flatten a batch into printable per-request outputs.
pub fn render(batch: BatchConversionResult) -> Vec<RequestOutput> {
    batch
        .into_iter()
        .map(|entry| match entry.outcome {
            Ok(result) => RequestOutput {
                request_id: entry.request.id,
                status: OutputStatus::Ok,
                result: Some(result),
                error: None,
            },
            Err(err) => RequestOutput {
                request_id: entry.request.id,
                status: OutputStatus::Error,
                result: None,
                error: Some(ErrorOutput {
                    code: err.error_code(),
                    message: err.to_string(),
                }),
            },
        })
        .collect()
}
