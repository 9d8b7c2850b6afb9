//! Exact decimal arithmetic helpers.
//!
//! Amounts and rates enter as [`Decimal`] and are lifted into [`BigDecimal`]
//! for arithmetic, so products never lose digits and nothing touches binary
//! floating point. Quotients that do not terminate are carried to 100
//! significant digits before the final rounding.

use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode, Zero};
use rust_decimal::Decimal;

use crate::error::{CommonError, Result};

/// Largest number of fractional digits a [`Decimal`] can hold.
pub const MAX_FRACTION_DIGITS: u32 = 28;

/// Parse a decimal string without losing precision.
///
/// Plain notation (`"100.12122"`) and scientific notation (`"1.5e-3"`) are
/// accepted. A value with more digits than can be represented exactly is
/// rejected rather than silently rounded.
pub fn parse_decimal(value: &str) -> Result<Decimal> {
    let trimmed = value.trim();
    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str_exact(trimmed)
    };

    parsed.map_err(|e| CommonError::InvalidDecimal {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Lift a [`Decimal`] into an arbitrary-precision value.
pub fn to_exact(value: Decimal) -> BigDecimal {
    BigDecimal::new(BigInt::from(value.mantissa()), i64::from(value.scale()))
}

/// Nearest [`Decimal`] to `value`, keeping at most 28 significant digits.
///
/// `None` when the integer part does not fit.
pub fn to_decimal(value: &BigDecimal) -> Option<Decimal> {
    let mut narrowed = if value.digits() > u64::from(MAX_FRACTION_DIGITS) {
        value.with_prec(u64::from(MAX_FRACTION_DIGITS))
    } else {
        value.clone()
    };

    let scale = narrowed.fractional_digit_count();
    if scale > i64::from(MAX_FRACTION_DIGITS) {
        narrowed = narrowed.with_scale_round(i64::from(MAX_FRACTION_DIGITS), RoundingMode::HalfUp);
    } else if scale < 0 {
        narrowed = narrowed.with_scale(0);
    }

    let (mantissa, scale) = narrowed.as_bigint_and_exponent();
    let mantissa = i128::try_from(mantissa).ok()?;
    let scale = u32::try_from(scale).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Divide, or `None` on a zero denominator.
pub fn exact_div(numerator: &BigDecimal, denominator: &BigDecimal) -> Option<BigDecimal> {
    if denominator.is_zero() {
        return None;
    }
    Some(numerator / denominator)
}

/// Round half-up to exactly `digits` fractional digits.
///
/// A discarded tail starting with 5 rounds away from zero (`2.5 -> 3`,
/// `-2.5 -> -3`). The result always carries `digits` fractional digits
/// (`10000` at 3 digits is `10000.000`).
pub fn round_half_up(value: &BigDecimal, digits: u32) -> BigDecimal {
    value.with_scale_round(i64::from(digits), RoundingMode::HalfUp)
}
