//! Decimal helpers shared by the curves and the single hop calculator.
//!
//! Raw ("micro") token amounts are plain `u128`s; everything a curve touches is a
//! human-readable [`BigDecimal`]. Conversions between the two are exact on the way
//! in and round to the nearest whole raw unit on the way out.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, FromPrimitive, One, RoundingMode, Signed, ToPrimitive, Zero};

use crate::error::SwapError;
use crate::utils::constants::WORKING_PRECISION;

/// Rounds a value to the solver's working precision.
#[must_use]
pub fn working(value: &BigDecimal) -> BigDecimal {
    value.with_prec(WORKING_PRECISION)
}

/// Converts a raw amount into its human-readable form.
#[must_use]
pub fn from_raw(raw: u128, decimals: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(raw), i64::from(decimals))
}

/// Converts a human-readable amount into raw units, rounding half-up to the
/// nearest whole raw unit.
///
/// # Errors
/// * `AmountOutOfRange` if the amount is negative or does not fit in a `u128`
pub fn to_raw(amount: &BigDecimal, decimals: u32) -> Result<u128, SwapError> {
    let (digits, _) = amount
        .with_scale_round(i64::from(decimals), RoundingMode::HalfUp)
        .into_bigint_and_exponent();
    digits
        .to_u128()
        .ok_or_else(|| SwapError::AmountOutOfRange(amount.to_string()))
}

/// Raises `base` to a non-negative `exponent`.
///
/// The integer part of the exponent is applied exactly by repeated squaring;
/// a fractional remainder goes through `f64`.
///
/// # Errors
/// * `InvalidPool` for a negative base or exponent, or a fractional power that
///   `f64` can not represent
pub fn pow(base: &BigDecimal, exponent: &BigDecimal) -> Result<BigDecimal, SwapError> {
    if base.is_negative() || exponent.is_negative() {
        return Err(SwapError::InvalidPool(format!(
            "cannot raise {base} to the power {exponent}"
        )));
    }
    if exponent.is_zero() {
        return Ok(BigDecimal::one());
    }
    if base.is_zero() {
        return Ok(BigDecimal::zero());
    }

    let whole = exponent.with_scale_round(0, RoundingMode::Down);
    let fraction = exponent - &whole;
    let whole = whole
        .to_u64()
        .ok_or_else(|| SwapError::InvalidPool(format!("exponent {exponent} is too large")))?;

    let mut result = powi(base, whole);
    if !fraction.is_zero() {
        let partial = base
            .to_f64()
            .zip(fraction.to_f64())
            .map(|(b, f)| b.powf(f))
            .and_then(BigDecimal::from_f64)
            .ok_or_else(|| {
                SwapError::InvalidPool(format!("cannot evaluate {base}^{fraction}"))
            })?;
        result = working(&(result * partial));
    }
    Ok(result)
}

/// Integer power by repeated squaring, at working precision.
fn powi(base: &BigDecimal, mut exponent: u64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut square = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = working(&(&result * &square));
        }
        exponent >>= 1;
        if exponent > 0 {
            square = working(&(&square * &square));
        }
    }
    result
}

/// Square root at working precision.
///
/// # Errors
/// * `InvalidPool` for a negative input
pub fn sqrt(value: &BigDecimal) -> Result<BigDecimal, SwapError> {
    value
        .sqrt()
        .map(|root| working(&root))
        .ok_or_else(|| SwapError::InvalidPool(format!("cannot take square root of {value}")))
}
