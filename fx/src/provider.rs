//! Data provider trait and an in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use ratematch_common::TenantId;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::conversion::ConversionRequest;
use crate::error::FxResult;
use crate::rate::{ExchangeRate, RateTypeDetail, TenantSettings};

/// Source of exchange rates and tenant metadata.
///
/// Implementations talk to a database, cache or market-data feed. Failures
/// are reported as [`crate::ConversionError::ProviderFailure`].
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// All rates of `tenant` whose rate type appears among `requests`.
    ///
    /// May return more records than needed; the engine filters again.
    async fn fetch_candidate_rates(
        &self,
        requests: &[ConversionRequest],
        tenant: &TenantId,
        settings: Option<&TenantSettings>,
    ) -> FxResult<Vec<ExchangeRate>>;

    /// Default provider/source settings of a tenant, if configured.
    async fn fetch_default_tenant_settings(&self, tenant: &TenantId)
        -> FxResult<Option<TenantSettings>>;

    /// Metadata for each requested rate type that has any.
    async fn fetch_rate_type_details(
        &self,
        tenant: &TenantId,
        rate_types: &BTreeSet<String>,
    ) -> FxResult<HashMap<String, RateTypeDetail>>;
}

/// Data provider backed by in-process maps.
pub struct InMemoryDataProvider {
    name: String,
    rates: DashMap<TenantId, Vec<ExchangeRate>>,
    settings: DashMap<TenantId, TenantSettings>,
    details: DashMap<(TenantId, String), RateTypeDetail>,
}

impl InMemoryDataProvider {
    /// Create a new in-memory provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: DashMap::new(),
            settings: DashMap::new(),
            details: DashMap::new(),
        }
    }

    /// Add a rate under its own tenant.
    pub fn add_rate(&self, rate: ExchangeRate) {
        self.rates.entry(rate.tenant_id.clone()).or_default().push(rate);
    }

    /// Add several rates.
    pub fn add_rates(&self, rates: impl IntoIterator<Item = ExchangeRate>) {
        for rate in rates {
            self.add_rate(rate);
        }
    }

    /// Set the default settings of a tenant.
    pub fn set_tenant_settings(&self, tenant: TenantId, settings: TenantSettings) {
        self.settings.insert(tenant, settings);
    }

    /// Set metadata for a tenant's rate type.
    pub fn set_rate_type_detail(
        &self,
        tenant: TenantId,
        rate_type: impl Into<String>,
        detail: RateTypeDetail,
    ) {
        self.details.insert((tenant, rate_type.into()), detail);
    }

    /// Number of rates stored for a tenant.
    pub fn rate_count(&self, tenant: &TenantId) -> usize {
        self.rates.get(tenant).map_or(0, |rates| rates.len())
    }
}

#[async_trait]
impl DataProvider for InMemoryDataProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candidate_rates(
        &self,
        requests: &[ConversionRequest],
        tenant: &TenantId,
        settings: Option<&TenantSettings>,
    ) -> FxResult<Vec<ExchangeRate>> {
        let rate_types: BTreeSet<&str> = requests.iter().map(|r| r.rate_type.as_str()).collect();

        let rates: Vec<ExchangeRate> = self
            .rates
            .get(tenant)
            .map(|stored| {
                stored
                    .iter()
                    .filter(|rate| rate_types.contains(rate.rate_type.as_str()))
                    .filter(|rate| settings.map_or(true, |s| s.matches(rate)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            provider = %self.name,
            tenant = %tenant,
            count = rates.len(),
            "Fetched candidate rates"
        );
        Ok(rates)
    }

    async fn fetch_default_tenant_settings(
        &self,
        tenant: &TenantId,
    ) -> FxResult<Option<TenantSettings>> {
        Ok(self.settings.get(tenant).map(|s| s.clone()))
    }

    async fn fetch_rate_type_details(
        &self,
        tenant: &TenantId,
        rate_types: &BTreeSet<String>,
    ) -> FxResult<HashMap<String, RateTypeDetail>> {
        Ok(rate_types
            .iter()
            .filter_map(|rate_type| {
                self.details
                    .get(&(tenant.clone(), rate_type.clone()))
                    .map(|detail| (rate_type.clone(), detail.clone()))
            })
            .collect())
    }
}
