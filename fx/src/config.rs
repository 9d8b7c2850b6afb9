//! Engine configuration.

use ratematch_common::{Currency, CurrencyRegistry, MAX_FRACTION_DIGITS};

/// Default upper bound on requests per batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Default batch size from which per-request work runs on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Configuration for the conversion engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of requests accepted by one batch call.
    pub max_batch_size: usize,
    /// Batches with at least this many requests are evaluated in parallel.
    pub parallel_threshold: usize,
    /// Non-ISO currencies and their fraction digits.
    pub extra_currencies: Vec<(Currency, u32)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            extra_currencies: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("RATEMATCH_MAX_BATCH_SIZE") {
            if let Ok(size) = size.parse() {
                config.max_batch_size = size;
            }
        }

        if let Ok(threshold) = std::env::var("RATEMATCH_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = threshold.parse() {
                config.parallel_threshold = threshold;
            }
        }

        config
    }

    /// Register an additional currency.
    pub fn with_currency(mut self, currency: Currency, fraction_digits: u32) -> Self {
        self.extra_currencies.push((currency, fraction_digits));
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("Max batch size cannot be 0".to_string());
        }

        if self.parallel_threshold == 0 {
            return Err("Parallel threshold cannot be 0".to_string());
        }

        if let Some((currency, digits)) = self
            .extra_currencies
            .iter()
            .find(|(_, digits)| *digits > MAX_FRACTION_DIGITS)
        {
            return Err(format!(
                "Currency {} has {} fraction digits, maximum is {}",
                currency, digits, MAX_FRACTION_DIGITS
            ));
        }

        Ok(())
    }

    /// Build the currency registry: ISO 4217 plus configured extras.
    pub fn currency_registry(&self) -> CurrencyRegistry {
        self.extra_currencies
            .iter()
            .fold(CurrencyRegistry::iso4217(), |registry, (currency, digits)| {
                registry.with_currency(currency.clone(), *digits)
            })
    }
}
