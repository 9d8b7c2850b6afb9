//! ratematch FX engine
//!
//! Resolves the single applicable exchange rate for a conversion request out
//! of a tenant's candidate pool and converts the amount with exact decimal
//! arithmetic and currency-aware rounding.
//!
//! # Features
//!
//! - Direct, inverted and reference-currency rate resolution
//! - Rejection of ambiguous (duplicate) rate records
//! - Round-half-up rounding to the target currency's fraction digits
//! - Batch conversion with per-request outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use ratematch_fx::{ConversionEngine, ConversionRequest, EngineConfig, InMemoryDataProvider};
//! use ratematch_common::{Currency, TenantId};
//!
//! let provider = Arc::new(InMemoryDataProvider::new("memory"));
//! let engine = ConversionEngine::new(provider, EngineConfig::default())?;
//!
//! let request = ConversionRequest::from_str_amount(
//!     Currency::usd(), Currency::eur(), "100.00", "M", as_of,
//! )?;
//! let result = engine.convert(&request, &TenantId::new("acme"), None).await?;
//! ```

pub mod batch;
pub mod calculator;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod provider;
pub mod rate;
pub mod validation;

pub use batch::{BatchConversionResult, BatchEntry};
pub use config::EngineConfig;
pub use conversion::{ConversionRequest, ConversionRequestBuilder, ConversionResult, ResolutionStrategy};
pub use engine::ConversionEngine;
pub use error::{ConversionError, FxResult};
pub use matcher::{RateMatcher, ReferenceLegs, ResolvedRate};
pub use provider::{DataProvider, InMemoryDataProvider};
pub use rate::{ExchangeRate, RateTypeDetail, TenantSettings};
