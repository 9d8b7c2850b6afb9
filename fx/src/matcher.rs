//! Resolution of the single applicable rate for a conversion request.
//!
//! Candidates are narrowed by rate type, validity date and tenant settings,
//! then searched in priority order:
//!
//! 1. a record quoting the requested pair,
//! 2. a record quoting the reversed pair, if the rate type allows inversion,
//! 3. two legs through the rate type's reference currency.
//!
//! Within each step the record with the latest `valid_from` wins. Several
//! records sharing that latest date are ambiguous and fail the request.

use ratematch_common::{to_decimal, Currency, TenantId};
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculator::combine_reference_legs;
use crate::conversion::{ConversionRequest, ResolutionStrategy};
use crate::error::{ConversionError, FxResult};
use crate::rate::{ExchangeRate, RateTypeDetail, TenantSettings};

/// A rate chosen for a request together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRate {
    /// Rate oriented `request.from -> request.to`.
    pub rate: ExchangeRate,
    /// Strategy that produced the rate.
    pub strategy: ResolutionStrategy,
    /// Legs behind a reference-currency rate; amounts are converted through
    /// these rather than through the rounded synthetic value.
    pub legs: Option<ReferenceLegs>,
}

/// The two legs of a reference-currency triangulation, each oriented
/// `leg currency -> reference currency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLegs {
    pub from_leg: ExchangeRate,
    pub to_leg: ExchangeRate,
}

/// Selects rates out of a tenant's candidate pool.
pub struct RateMatcher<'a> {
    tenant_id: &'a TenantId,
    candidates: &'a [ExchangeRate],
    detail: Option<&'a RateTypeDetail>,
    settings: Option<&'a TenantSettings>,
}

impl<'a> RateMatcher<'a> {
    /// Create a matcher over an already tenant-scoped candidate pool.
    pub fn new(
        tenant_id: &'a TenantId,
        candidates: &'a [ExchangeRate],
        detail: Option<&'a RateTypeDetail>,
        settings: Option<&'a TenantSettings>,
    ) -> Self {
        Self {
            tenant_id,
            candidates,
            detail,
            settings,
        }
    }

    /// Resolve the rate to apply to `request`.
    pub fn resolve(&self, request: &ConversionRequest) -> FxResult<ResolvedRate> {
        if request.is_same_currency() {
            return Ok(ResolvedRate {
                rate: self.identity_rate(request),
                strategy: ResolutionStrategy::SameCurrency,
                legs: None,
            });
        }

        if self.candidates.is_empty() {
            return Err(ConversionError::EmptyExchangeRateList);
        }

        let eligible: Vec<&ExchangeRate> = self
            .candidates
            .iter()
            .filter(|rate| self.is_eligible(rate, request))
            .collect();

        let from = &request.from_currency;
        let to = &request.to_currency;

        if let Some(rate) = latest_for_pair(&eligible, from, to)? {
            debug!(request_id = %request.id, pair = %pair_label(from, to), "Resolved direct rate");
            return Ok(ResolvedRate {
                rate: rate.clone(),
                strategy: ResolutionStrategy::Direct,
                legs: None,
            });
        }

        if self.inversion_allowed() {
            if let Some(rate) = latest_for_pair(&eligible, to, from)? {
                debug!(request_id = %request.id, pair = %pair_label(to, from), "Resolved inverted rate");
                return Ok(ResolvedRate {
                    rate: rate.inverted(),
                    strategy: ResolutionStrategy::Inverted,
                    legs: None,
                });
            }
        }

        if let Some(reference) = self.reference_currency() {
            if let Some((rate, legs)) = self.triangulate(&eligible, request, reference)? {
                debug!(
                    request_id = %request.id,
                    reference = %reference,
                    value = %rate.value,
                    "Resolved rate through reference currency"
                );
                return Ok(ResolvedRate {
                    rate,
                    strategy: ResolutionStrategy::ReferenceCurrency,
                    legs: Some(legs),
                });
            }
        }

        Err(ConversionError::NoMatchingExchangeRateRecord {
            from: from.clone(),
            to: to.clone(),
            rate_type: request.rate_type.clone(),
        })
    }

    fn is_eligible(&self, rate: &ExchangeRate, request: &ConversionRequest) -> bool {
        rate.rate_type == request.rate_type
            && rate.valid_from <= request.as_of
            && self.settings.map_or(true, |settings| settings.matches(rate))
    }

    fn inversion_allowed(&self) -> bool {
        self.detail.map_or(false, |detail| detail.is_inversion_allowed)
    }

    fn reference_currency(&self) -> Option<&'a Currency> {
        self.detail.and_then(|detail| detail.reference_currency.as_ref())
    }

    fn triangulate(
        &self,
        eligible: &[&ExchangeRate],
        request: &ConversionRequest,
        reference: &Currency,
    ) -> FxResult<Option<(ExchangeRate, ReferenceLegs)>> {
        let Some(from_leg) = self.leg(eligible, &request.from_currency, reference)? else {
            return Ok(None);
        };
        let Some(to_leg) = self.leg(eligible, &request.to_currency, reference)? else {
            return Ok(None);
        };

        let combined = combine_reference_legs(&from_leg, &to_leg)?;
        let value = to_decimal(&combined).ok_or(ConversionError::ArithmeticOverflow("reference rate"))?;
        let template = if to_leg.valid_from > from_leg.valid_from {
            &to_leg
        } else {
            &from_leg
        };

        let rate = ExchangeRate {
            tenant_id: template.tenant_id.clone(),
            data_provider_code: template.data_provider_code.clone(),
            data_source: template.data_source.clone(),
            rate_type: request.rate_type.clone(),
            from_currency: request.from_currency.clone(),
            to_currency: request.to_currency.clone(),
            valid_from: template.valid_from,
            value,
            is_indirect: false,
            from_currency_factor: 1,
            to_currency_factor: 1,
        };
        Ok(Some((rate, ReferenceLegs { from_leg, to_leg })))
    }

    /// Find the leg quoting `currency` against `reference`.
    ///
    /// A currency that is the reference currency itself has no leg; that
    /// pair is only reachable through the direct or inverted steps.
    fn leg(
        &self,
        eligible: &[&ExchangeRate],
        currency: &Currency,
        reference: &Currency,
    ) -> FxResult<Option<ExchangeRate>> {
        if currency == reference {
            return Ok(None);
        }

        if let Some(rate) = latest_for_pair(eligible, currency, reference)? {
            return Ok(Some(rate.clone()));
        }

        if self.inversion_allowed() {
            if let Some(rate) = latest_for_pair(eligible, reference, currency)? {
                return Ok(Some(rate.inverted()));
            }
        }

        Ok(None)
    }

    fn identity_rate(&self, request: &ConversionRequest) -> ExchangeRate {
        let mut rate = ExchangeRate::new(
            self.tenant_id.clone(),
            request.rate_type.clone(),
            request.from_currency.clone(),
            request.to_currency.clone(),
            Decimal::ONE,
            request.as_of,
        );
        if let Some(settings) = self.settings {
            rate = rate.with_source(
                settings.data_provider_code.clone(),
                settings.data_source.clone(),
            );
        }
        rate
    }
}

/// Latest record quoting `from -> to`, or an error if that date is shared.
fn latest_for_pair<'r>(
    eligible: &[&'r ExchangeRate],
    from: &Currency,
    to: &Currency,
) -> FxResult<Option<&'r ExchangeRate>> {
    let mut latest: Option<&'r ExchangeRate> = None;
    let mut tied = false;

    for rate in eligible.iter().copied().filter(|rate| rate.quotes(from, to)) {
        match latest {
            Some(current) if rate.valid_from < current.valid_from => {}
            Some(current) if rate.valid_from == current.valid_from => tied = true,
            _ => {
                latest = Some(rate);
                tied = false;
            }
        }
    }

    match latest {
        Some(rate) if tied => Err(ConversionError::AmbiguousExchangeRateRecord {
            from: from.clone(),
            to: to.clone(),
            valid_from: rate.valid_from,
        }),
        other => Ok(other),
    }
}

fn pair_label(from: &Currency, to: &Currency) -> String {
    format!("{}/{}", from, to)
}
