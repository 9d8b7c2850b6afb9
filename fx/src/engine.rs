//! Conversion engine: loads candidates from the data provider and resolves
//! each request independently.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ratematch_common::{CurrencyRegistry, TenantId};
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::batch::{BatchConversionResult, BatchEntry};
use crate::calculator::calculate;
use crate::config::EngineConfig;
use crate::conversion::{ConversionRequest, ConversionResult, ResolutionStrategy};
use crate::error::{ConversionError, FxResult};
use crate::matcher::{RateMatcher, ResolvedRate};
use crate::provider::DataProvider;
use crate::rate::{ExchangeRate, RateTypeDetail, TenantSettings};
use crate::validation::{validate_batch, validate_request, validate_tenant};

/// Everything the matcher needs for one tenant, fetched once per call.
#[derive(Debug)]
struct ConversionContext {
    tenant: TenantId,
    rates: Vec<ExchangeRate>,
    details: HashMap<String, RateTypeDetail>,
    settings: Option<TenantSettings>,
}

/// The conversion engine.
pub struct ConversionEngine {
    provider: Arc<dyn DataProvider>,
    registry: Arc<CurrencyRegistry>,
    config: EngineConfig,
}

impl ConversionEngine {
    /// Create a new engine with the given provider.
    ///
    /// Fails with [`ConversionError::InvalidParameters`] if `config` does not
    /// validate.
    pub fn new(provider: Arc<dyn DataProvider>, config: EngineConfig) -> FxResult<Self> {
        config.validate().map_err(ConversionError::InvalidParameters)?;

        Ok(Self {
            provider,
            registry: Arc::new(config.currency_registry()),
            config,
        })
    }

    /// Get the currency registry used for rounding.
    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Convert a single request.
    ///
    /// `settings_override` takes precedence over the tenant's default
    /// settings from the provider.
    #[instrument(skip(self, request, tenant, settings_override), fields(
        request_id = %request.id,
        from_currency = %request.from_currency,
        to_currency = %request.to_currency,
        rate_type = %request.rate_type,
        tenant = %tenant
    ))]
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        tenant: &TenantId,
        settings_override: Option<&TenantSettings>,
    ) -> FxResult<ConversionResult> {
        validate_tenant(tenant)?;
        validate_request(request)?;

        let context = self
            .load_context(std::slice::from_ref(request), tenant, settings_override)
            .await?;
        let result = evaluate(&context, &self.registry, request)?;

        info!(
            strategy = ?result.strategy,
            rounded_amount = %result.rounded_amount,
            "Conversion completed"
        );
        Ok(result)
    }

    /// Convert a batch of requests.
    ///
    /// Invalid input and provider failures fail the whole call. Every other
    /// error is stored as the outcome of the request that caused it.
    #[instrument(skip(self, requests, tenant, settings_override), fields(
        tenant = %tenant,
        requests = requests.len()
    ))]
    pub async fn convert_batch(
        &self,
        requests: &[ConversionRequest],
        tenant: &TenantId,
        settings_override: Option<&TenantSettings>,
    ) -> FxResult<BatchConversionResult> {
        validate_batch(requests, self.config.max_batch_size)?;
        validate_tenant(tenant)?;

        let context = self.load_context(requests, tenant, settings_override).await?;

        let outcomes: Vec<FxResult<ConversionResult>> =
            if requests.len() >= self.config.parallel_threshold {
                debug!("Evaluating batch in parallel");
                let registry = Arc::clone(&self.registry);
                let pending = requests.to_vec();
                tokio::task::spawn_blocking(move || {
                    pending
                        .par_iter()
                        .map(|request| evaluate_checked(&context, &registry, request))
                        .collect::<Vec<_>>()
                })
                .await
                .map_err(|e| ConversionError::Internal(format!("batch evaluation task failed: {}", e)))?
            } else {
                requests
                    .iter()
                    .map(|request| evaluate_checked(&context, &self.registry, request))
                    .collect()
            };

        let batch = BatchConversionResult::new(
            requests
                .iter()
                .cloned()
                .zip(outcomes)
                .map(|(request, outcome)| BatchEntry { request, outcome })
                .collect(),
        );

        for (request, err) in batch.failures() {
            warn!(request_id = %request.id, code = err.error_code(), error = %err, "Conversion failed");
        }
        info!(
            succeeded = batch.success_count(),
            failed = batch.failure_count(),
            "Batch conversion completed"
        );

        Ok(batch)
    }

    /// Resolve and convert against a caller-held candidate pool.
    pub fn convert_with_candidates(
        &self,
        request: &ConversionRequest,
        tenant: &TenantId,
        candidates: &[ExchangeRate],
        detail: Option<&RateTypeDetail>,
        settings: Option<&TenantSettings>,
    ) -> FxResult<ConversionResult> {
        validate_request(request)?;

        let resolved = RateMatcher::new(tenant, candidates, detail, settings).resolve(request)?;
        calculate(request, resolved, &self.registry)
    }

    /// Convert with a caller-supplied rate, skipping resolution.
    ///
    /// The rate is applied directly (`amount * rate`) and rounded to the
    /// target currency.
    pub fn convert_with_fixed_rate(
        &self,
        request: &ConversionRequest,
        tenant: &TenantId,
        rate: Decimal,
    ) -> FxResult<ConversionResult> {
        validate_request(request)?;

        let fixed = ExchangeRate::new(
            tenant.clone(),
            request.rate_type.clone(),
            request.from_currency.clone(),
            request.to_currency.clone(),
            rate,
            request.as_of,
        );
        let resolved = ResolvedRate {
            rate: fixed,
            strategy: ResolutionStrategy::FixedRate,
            legs: None,
        };
        calculate(request, resolved, &self.registry)
    }

    /// Fetch settings, rate type details and candidate rates for `requests`.
    async fn load_context(
        &self,
        requests: &[ConversionRequest],
        tenant: &TenantId,
        settings_override: Option<&TenantSettings>,
    ) -> FxResult<ConversionContext> {
        if requests.iter().all(ConversionRequest::is_same_currency) {
            debug!("All requests are same-currency, skipping provider");
            return Ok(ConversionContext {
                tenant: tenant.clone(),
                rates: Vec::new(),
                details: HashMap::new(),
                settings: settings_override.cloned(),
            });
        }

        let rate_types: BTreeSet<String> = requests.iter().map(|r| r.rate_type.clone()).collect();

        let settings_future = async {
            match settings_override {
                Some(settings) => Ok(Some(settings.clone())),
                None => self.provider.fetch_default_tenant_settings(tenant).await,
            }
        };
        let details_future = self.provider.fetch_rate_type_details(tenant, &rate_types);

        let (settings, details) = tokio::try_join!(settings_future, details_future)
            .map_err(|e| self.provider_error(tenant, e))?;

        let mut rates = self
            .provider
            .fetch_candidate_rates(requests, tenant, settings.as_ref())
            .await
            .map_err(|e| self.provider_error(tenant, e))?;

        let fetched = rates.len();
        rates.retain(|rate| rate.tenant_id == *tenant);
        if rates.len() < fetched {
            warn!(
                provider = self.provider.name(),
                dropped = fetched - rates.len(),
                "Provider returned rates of other tenants"
            );
        }

        debug!(
            provider = self.provider.name(),
            rates = rates.len(),
            rate_types = details.len(),
            has_settings = settings.is_some(),
            "Loaded conversion context"
        );

        Ok(ConversionContext {
            tenant: tenant.clone(),
            rates,
            details,
            settings,
        })
    }

    fn provider_error(&self, tenant: &TenantId, err: ConversionError) -> ConversionError {
        warn!(provider = self.provider.name(), tenant = %tenant, error = %err, "Data provider call failed");
        match err {
            ConversionError::ProviderFailure(_) => err,
            other => ConversionError::ProviderFailure(other.to_string()),
        }
    }
}

fn evaluate_checked(
    context: &ConversionContext,
    registry: &CurrencyRegistry,
    request: &ConversionRequest,
) -> FxResult<ConversionResult> {
    validate_request(request)?;
    evaluate(context, registry, request)
}

fn evaluate(
    context: &ConversionContext,
    registry: &CurrencyRegistry,
    request: &ConversionRequest,
) -> FxResult<ConversionResult> {
    let resolved = RateMatcher::new(
        &context.tenant,
        &context.rates,
        context.details.get(&request.rate_type),
        context.settings.as_ref(),
    )
    .resolve(request)?;

    calculate(request, resolved, registry)
}
