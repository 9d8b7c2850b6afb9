//! Amount calculation for a resolved rate.
//!
//! All arithmetic runs on [`BigDecimal`]; only the final rounding to the
//! target currency's fraction digits discards digits.

use bigdecimal::{BigDecimal, One};
use ratematch_common::{exact_div, round_half_up, to_exact, CurrencyRegistry};

use crate::conversion::{ConversionRequest, ConversionResult, ResolutionStrategy};
use crate::error::{ConversionError, FxResult};
use crate::matcher::{ReferenceLegs, ResolvedRate};
use crate::rate::ExchangeRate;

/// Apply a rate to an amount without rounding.
///
/// Direct: `amount * value * to_factor / from_factor`.
/// Indirect: `amount * to_factor / (from_factor * value)`.
///
/// A zero factor, or a zero value on an indirect rate, fails with
/// [`ConversionError::ZeroCurrencyFactor`]. A zero value on a direct rate
/// converts to zero.
pub fn apply_rate(amount: &BigDecimal, rate: &ExchangeRate) -> FxResult<BigDecimal> {
    if rate.has_zero_factor() || (rate.is_indirect && rate.value.is_zero()) {
        return Err(ConversionError::zero_factor(&rate.from_currency, &rate.to_currency));
    }

    let value = to_exact(rate.value);
    let from_factor = BigDecimal::from(rate.from_currency_factor);
    let to_factor = BigDecimal::from(rate.to_currency_factor);

    let (numerator, denominator) = if rate.is_indirect {
        (amount * &to_factor, from_factor * value)
    } else {
        (amount * &value * &to_factor, from_factor)
    };

    if denominator.is_one() {
        return Ok(numerator);
    }
    exact_div(&numerator, &denominator)
        .ok_or_else(|| ConversionError::zero_factor(&rate.from_currency, &rate.to_currency))
}

/// Reference units per one unit of the leg currency.
fn reference_units(leg: &ExchangeRate) -> FxResult<BigDecimal> {
    apply_rate(&BigDecimal::one(), leg)
}

/// Divide by the to leg's reference units, failing on zero.
fn per_to_leg(value: &BigDecimal, to_leg: &ExchangeRate) -> FxResult<BigDecimal> {
    let to_units = reference_units(to_leg)?;
    exact_div(value, &to_units)
        .ok_or_else(|| ConversionError::zero_factor(&to_leg.from_currency, &to_leg.to_currency))
}

/// Combine two reference legs into a single direct `from -> to` value.
///
/// Each leg quotes its currency against the reference currency. A leg is
/// normalised to reference units per one unit of its currency; the combined
/// value is the ratio of the from leg to the to leg.
pub fn combine_reference_legs(from_leg: &ExchangeRate, to_leg: &ExchangeRate) -> FxResult<BigDecimal> {
    per_to_leg(&reference_units(from_leg)?, to_leg)
}

/// Convert through both reference legs: `amount * m_from / m_to`.
pub fn convert_through_reference(amount: &BigDecimal, legs: &ReferenceLegs) -> FxResult<BigDecimal> {
    let from_units = reference_units(&legs.from_leg)?;
    per_to_leg(&(amount * &from_units), &legs.to_leg)
}

/// Compute converted and rounded amounts for a request and its resolved rate.
///
/// Same-currency requests keep the input amount unrounded on both sides.
pub fn calculate(
    request: &ConversionRequest,
    resolved: ResolvedRate,
    registry: &CurrencyRegistry,
) -> FxResult<ConversionResult> {
    let amount = to_exact(request.amount);

    let (converted_amount, rounded_amount) = if resolved.strategy == ResolutionStrategy::SameCurrency {
        (amount.clone(), amount)
    } else {
        let converted = match &resolved.legs {
            Some(legs) => convert_through_reference(&amount, legs)?,
            None => apply_rate(&amount, &resolved.rate)?,
        };
        let digits = registry.fraction_digits(&request.to_currency)?;
        let rounded = round_half_up(&converted, digits);
        (converted, rounded)
    };

    Ok(ConversionResult {
        request_id: request.id,
        resolved_rate: resolved.rate,
        strategy: resolved.strategy,
        converted_amount,
        rounded_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratematch_common::{Currency, TenantId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn big(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn rate(from: &str, to: &str, value: Decimal) -> ExchangeRate {
        ExchangeRate::new(
            TenantId::new("acme"),
            "M",
            Currency::new(from),
            Currency::new(to),
            value,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn request(from: &str, to: &str, amount: Decimal) -> ConversionRequest {
        ConversionRequest::new(
            Currency::new(from),
            Currency::new(to),
            amount,
            "M",
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    fn direct(rate: ExchangeRate) -> ResolvedRate {
        ResolvedRate {
            rate,
            strategy: ResolutionStrategy::Direct,
            legs: None,
        }
    }

    #[test]
    fn test_direct() {
        let converted = apply_rate(&big("100"), &rate("INR", "EUR", dec!(100))).unwrap();
        assert_eq!(converted.to_string(), "10000");
    }

    #[test]
    fn test_indirect() {
        let converted = apply_rate(&big("100"), &rate("USD", "EUR", dec!(4)).indirect()).unwrap();
        assert_eq!(converted, big("25"));
    }

    #[test]
    fn test_factors() {
        // 100 JPY quoted at 0.9 USD.
        let jpy_usd = rate("JPY", "USD", dec!(0.9)).with_factors(100, 1);
        assert_eq!(apply_rate(&big("1000"), &jpy_usd).unwrap(), big("9"));

        // 3 * 10 / (1 * 2)
        let usd_jpy = rate("USD", "JPY", dec!(2)).indirect().with_factors(1, 10);
        assert_eq!(apply_rate(&big("3"), &usd_jpy).unwrap(), big("15"));
    }

    #[test]
    fn test_inverted_rate_round_trips_amount() {
        let forward = rate("JPY", "USD", dec!(0.9)).with_factors(100, 1);
        let usd = apply_rate(&big("1000"), &forward).unwrap();
        let jpy = apply_rate(&usd, &forward.inverted()).unwrap();
        assert_eq!(jpy, big("1000"));
    }

    #[test]
    fn test_zero_value_direct_is_zero() {
        let converted = apply_rate(&big("100"), &rate("USD", "EUR", Decimal::ZERO)).unwrap();
        assert_eq!(converted, BigDecimal::from(0));
    }

    #[test]
    fn test_zero_value_indirect_fails() {
        let err = apply_rate(&big("100"), &rate("USD", "EUR", Decimal::ZERO).indirect()).unwrap_err();
        assert!(matches!(err, ConversionError::ZeroCurrencyFactor { .. }));
    }

    #[test]
    fn test_zero_factor_fails() {
        for zero_rate in [
            rate("USD", "EUR", Decimal::ZERO).indirect().with_factors(1, 0),
            rate("USD", "EUR", Decimal::ZERO).indirect().with_factors(0, 1),
            rate("USD", "EUR", dec!(1.1)).with_factors(0, 1),
            rate("USD", "EUR", dec!(1.1)).with_factors(1, 0),
        ] {
            let err = apply_rate(&big("100"), &zero_rate).unwrap_err();
            assert_eq!(
                err,
                ConversionError::ZeroCurrencyFactor {
                    from: Currency::usd(),
                    to: Currency::eur(),
                }
            );
        }
    }

    #[test]
    fn test_product_is_exact() {
        let request = request("USD", "EUR", dec!(1.000000000000001));
        let result = calculate(
            &request,
            direct(rate("USD", "EUR", dec!(1.0000000000000000001))),
            &CurrencyRegistry::iso4217(),
        )
        .unwrap();

        assert_eq!(
            result.converted_amount,
            big("1.0000000000000010001000000000000001")
        );
        assert_eq!(result.rounded_amount, big("1.00"));
    }

    #[test]
    fn test_product_beyond_decimal_range() {
        let request = request("USD", "JPY", dec!(100000000000000000000));
        let result = calculate(
            &request,
            direct(rate("USD", "JPY", dec!(10000000000))),
            &CurrencyRegistry::iso4217(),
        )
        .unwrap();

        assert_eq!(result.converted_amount, big("1e30"));
        assert_eq!(result.rounded_amount, big("1e30"));
        assert_eq!(result.rounded_amount.fractional_digit_count(), 0);
    }

    #[test]
    fn test_combine_reference_legs() {
        let from_leg = rate("GBP", "USD", dec!(5));
        let to_leg = rate("CHF", "USD", dec!(10));
        assert_eq!(combine_reference_legs(&from_leg, &to_leg).unwrap(), big("0.5"));
    }

    #[test]
    fn test_combine_reference_legs_mixed_orientation() {
        // 1 GBP = 1.25 USD (indirect 0.8), 1 CHF = 1.1 USD via factors 10 -> 11.
        let from_leg = rate("GBP", "USD", dec!(0.8)).indirect();
        let to_leg = rate("CHF", "USD", dec!(1)).with_factors(10, 11);
        let combined = combine_reference_legs(&from_leg, &to_leg).unwrap();
        assert_eq!(round_half_up(&combined, 10), big("1.1363636364"));
    }

    #[test]
    fn test_combine_zero_to_leg_fails() {
        let from_leg = rate("GBP", "USD", dec!(5));
        let to_leg = rate("CHF", "USD", Decimal::ZERO);
        assert!(matches!(
            combine_reference_legs(&from_leg, &to_leg),
            Err(ConversionError::ZeroCurrencyFactor { .. })
        ));
    }

    #[test]
    fn test_reference_conversion_uses_exact_legs() {
        // 1 GBP = 1 USD, 1 CHF = 3 USD: 100 GBP is 33.33... CHF.
        let legs = ReferenceLegs {
            from_leg: rate("GBP", "USD", dec!(1)),
            to_leg: rate("CHF", "USD", dec!(3)),
        };
        let converted = convert_through_reference(&big("100"), &legs).unwrap();
        assert_eq!(round_half_up(&converted, 2), big("33.33"));
        assert!(converted.fractional_digit_count() > 28);
    }

    #[test]
    fn test_calculate_rounds_to_target_digits() {
        let registry = CurrencyRegistry::iso4217();
        let request = request("USD", "BHD", dec!(100.12122));
        let result = calculate(&request, direct(rate("USD", "BHD", dec!(100))), &registry).unwrap();

        assert_eq!(result.converted_amount, big("10012.122"));
        assert_eq!(result.rounded_amount.to_string(), "10012.122");
        assert_eq!(result.rounded_amount.fractional_digit_count(), 3);
        assert_eq!(result.request_id, request.id);
    }

    #[test]
    fn test_calculate_half_up() {
        let registry = CurrencyRegistry::iso4217();
        let request = request("USD", "BHD", dec!(1));
        let result = calculate(&request, direct(rate("USD", "BHD", dec!(6.0425223))), &registry).unwrap();

        assert_eq!(result.rounded_amount.to_string(), "6.043");
    }

    #[test]
    fn test_calculate_unknown_target_currency() {
        let registry = CurrencyRegistry::iso4217();
        let request = request("USD", "XXY", dec!(1));
        let err = calculate(&request, direct(rate("USD", "XXY", dec!(2))), &registry).unwrap_err();

        assert_eq!(err, ConversionError::UnknownCurrency("XXY".into()));
    }
}
