//! Exact numeric operations on [`BigRational`] values.
//!
//! Nothing in here ever touches floating point. Powers are only evaluated when
//! the answer is exactly representable, and rounding only happens when a value
//! is displayed or written into a [`crate::Solution`].

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeSet;
use thiserror::Error;

/// The largest exponent (or root index) we are willing to evaluate.
pub const MAX_EXPONENT: u32 = 10_000;

/// How many significant digits survive normalization.
pub const SIGNIFICANT_DIGITS: usize = 12;

/// Errors that may occur while evaluating numbers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{base}^{exponent} has no exact value")]
    InexactPower { base: String, exponent: String },
    #[error("the exponent {0} is too large to evaluate")]
    ExponentTooLarge(String),
}

/// `10^exponent` as an exact rational.
pub fn ten_to_the(exponent: i64) -> BigRational {
    let magnitude = num_traits::pow(
        BigInt::from(10),
        exponent.unsigned_abs() as usize,
    );
    let magnitude = BigRational::from_integer(magnitude);

    if exponent < 0 {
        magnitude.recip()
    } else {
        magnitude
    }
}

pub fn divide(
    left: &BigRational,
    right: &BigRational,
) -> Result<BigRational, EvaluationError> {
    if right.is_zero() {
        Err(EvaluationError::DivisionByZero)
    } else {
        Ok(left / right)
    }
}

/// Raise `base` to `exponent`.
///
/// Integer exponents are always exact. A rational exponent `p/q` only
/// succeeds when `base` has an exact `q`-th root.
pub fn pow(
    base: &BigRational,
    exponent: &BigRational,
) -> Result<BigRational, EvaluationError> {
    if exponent.is_integer() {
        return integer_pow(base, exponent.numer());
    }

    let index = exponent
        .denom()
        .to_u32()
        .filter(|index| *index <= MAX_EXPONENT)
        .ok_or_else(|| EvaluationError::ExponentTooLarge(exponent.to_string()))?;

    match exact_root(base, index) {
        Some(root) => integer_pow(&root, exponent.numer()),
        None => Err(EvaluationError::InexactPower {
            base: to_plain(base),
            exponent: to_plain(exponent),
        }),
    }
}

/// Raise the magnitude of `base` to `exponent`, then reapply the sign of
/// `base`. This is how a bare `-5^2` is read: `-(5^2)`.
pub fn signed_pow(
    base: &BigRational,
    exponent: &BigRational,
) -> Result<BigRational, EvaluationError> {
    let magnitude = pow(&base.abs(), exponent)?;

    if base.is_negative() {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

fn integer_pow(
    base: &BigRational,
    exponent: &BigInt,
) -> Result<BigRational, EvaluationError> {
    let magnitude = exponent
        .abs()
        .to_u32()
        .filter(|e| *e <= MAX_EXPONENT)
        .ok_or_else(|| EvaluationError::ExponentTooLarge(exponent.to_string()))?;

    if exponent.is_negative() {
        if base.is_zero() {
            return Err(EvaluationError::DivisionByZero);
        }
        Ok(num_traits::pow(base.recip(), magnitude as usize))
    } else {
        Ok(num_traits::pow(base.clone(), magnitude as usize))
    }
}

/// The exact real `n`-th root of `value`, if there is one.
pub fn exact_root(value: &BigRational, n: u32) -> Option<BigRational> {
    if n == 0 {
        return None;
    }

    if value.is_negative() {
        if n % 2 == 0 {
            return None;
        }
        return exact_root(&-value, n).map(|root| -root);
    }

    let numer = exact_integer_root(value.numer(), n)?;
    let denom = exact_integer_root(value.denom(), n)?;

    Some(BigRational::new(numer, denom))
}

fn exact_integer_root(value: &BigInt, n: u32) -> Option<BigInt> {
    let root = value.nth_root(n);

    if num_traits::pow(root.clone(), n as usize) == *value {
        Some(root)
    } else {
        None
    }
}

/// The divisors of a coefficient, as used when looking for common factors.
#[derive(Debug, Clone, PartialEq)]
pub enum Divisors {
    /// Zero is divisible by everything.
    Unconstrained,
    Known(BTreeSet<u64>),
    /// The magnitude reached the factorization limit.
    TooLarge,
}

impl Divisors {
    pub fn only_one() -> Self { Divisors::Known(std::iter::once(1).collect()) }
}

/// Find every positive divisor of `value`'s magnitude.
///
/// Values with a fractional part only have the trivial divisor, `1`.
pub fn divisors(value: &BigRational, limit: u64) -> Divisors {
    if value.is_zero() {
        return Divisors::Unconstrained;
    }
    if !value.is_integer() {
        return Divisors::only_one();
    }

    let magnitude = match value.numer().abs().to_u64() {
        Some(magnitude) if magnitude < limit => magnitude,
        _ => return Divisors::TooLarge,
    };

    let mut found = BTreeSet::new();
    let mut candidate = 1;

    while candidate * candidate <= magnitude {
        if magnitude % candidate == 0 {
            found.insert(candidate);
            found.insert(magnitude / candidate);
        }
        candidate += 1;
    }

    Divisors::Known(found)
}

/// Round `value` to `digits` significant digits (half to even).
///
/// The result is `(mantissa, exponent)` where `value ≈ mantissa * 10^exponent`
/// and the mantissa has exactly `digits` digits.
pub fn round_significant(value: &BigRational, digits: usize) -> (BigInt, i64) {
    if value.is_zero() {
        return (BigInt::zero(), 0);
    }

    let magnitude = value.abs();
    let adjusted = decimal_exponent(&magnitude);
    let mut exponent = adjusted - (digits as i64 - 1);
    let mut mantissa = round_half_even(&(&magnitude / ten_to_the(exponent)));

    if mantissa == *ten_to_the(digits as i64).numer() {
        mantissa /= BigInt::from(10);
        exponent += 1;
    }

    if value.is_negative() {
        mantissa = -mantissa;
    }

    (mantissa, exponent)
}

/// Round `value` to [`SIGNIFICANT_DIGITS`] significant digits, keeping it as
/// an exact rational.
pub fn normalize(value: &BigRational) -> BigRational {
    let (mantissa, exponent) = round_significant(value, SIGNIFICANT_DIGITS);
    BigRational::from_integer(mantissa) * ten_to_the(exponent)
}

/// `floor(log10(magnitude))` for a positive magnitude.
fn decimal_exponent(magnitude: &BigRational) -> i64 {
    let digits = |n: &BigInt| n.to_string().len() as i64;
    let mut exponent = digits(magnitude.numer()) - digits(magnitude.denom());

    while ten_to_the(exponent) > *magnitude {
        exponent -= 1;
    }
    while ten_to_the(exponent + 1) <= *magnitude {
        exponent += 1;
    }

    exponent
}

fn round_half_even(value: &BigRational) -> BigInt {
    let floor = value.floor();
    let remainder = value - &floor;
    let floor = floor.to_integer();
    let half = BigRational::new(BigInt::one(), BigInt::from(2));

    if remainder > half || (remainder == half && floor.is_odd()) {
        floor + BigInt::one()
    } else {
        floor
    }
}

/// Render a value positionally, the way it is written in an expression.
///
/// Terminating decimals are printed exactly. Anything else is rounded to
/// [`SIGNIFICANT_DIGITS`] significant digits.
pub fn to_plain(value: &BigRational) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    let magnitude = value.abs();

    let body = match terminating_places(magnitude.denom()) {
        Some(places) => {
            let scaled = (&magnitude * ten_to_the(places)).to_integer();
            positional(&scaled.to_string(), -places)
        },
        None => {
            let (mantissa, mut exponent) =
                round_significant(&magnitude, SIGNIFICANT_DIGITS);
            let mut digits = mantissa.to_string();

            while exponent < 0 && digits.ends_with('0') {
                digits.pop();
                exponent += 1;
            }
            positional(&digits, exponent)
        },
    };

    format!("{}{}", sign, body)
}

/// Render a value as a decimal calculator would display a result: rounded to
/// `digits` significant digits, fractional trailing zeros removed, and in
/// scientific notation when the digits can't reach the units place or the
/// value is very small (`1.6E+15`, `1.6E-13`).
pub fn to_scientific(value: &BigRational, digits: usize) -> String {
    let (mantissa, mut exponent) = round_significant(value, digits);

    if mantissa.is_zero() {
        return String::from("0");
    }

    let sign = if mantissa.is_negative() { "-" } else { "" };
    let mut text = mantissa.abs().to_string();
    let adjusted = exponent + text.len() as i64 - 1;

    let body = if exponent > 0 {
        scientific(text.trim_end_matches('0'), adjusted)
    } else {
        while exponent < 0 && text.ends_with('0') {
            text.pop();
            exponent += 1;
        }

        if adjusted < -6 {
            scientific(&text, adjusted)
        } else {
            positional(&text, exponent)
        }
    };

    format!("{}{}", sign, body)
}

fn scientific(digits: &str, adjusted: i64) -> String {
    let (first, rest) = digits.split_at(1);
    let sign = if adjusted < 0 { '-' } else { '+' };

    if rest.is_empty() {
        format!("{}E{}{}", first, sign, adjusted.abs())
    } else {
        format!("{}.{}E{}{}", first, rest, sign, adjusted.abs())
    }
}

/// Place the decimal point in `digits * 10^exponent`.
fn positional(digits: &str, exponent: i64) -> String {
    if exponent >= 0 {
        return format!("{}{}", digits, "0".repeat(exponent as usize));
    }

    let point = digits.len() as i64 + exponent;

    if point > 0 {
        let (whole, fraction) = digits.split_at(point as usize);
        format!("{}.{}", whole, fraction)
    } else {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    }
}

/// How many decimal places a fraction with this denominator needs, or `None`
/// if its decimal expansion never terminates.
fn terminating_places(denominator: &BigInt) -> Option<i64> {
    let mut remaining = denominator.clone();
    let two = BigInt::from(2);
    let five = BigInt::from(5);
    let (mut twos, mut fives) = (0, 0);

    while remaining.is_even() && !remaining.is_zero() {
        remaining /= &two;
        twos += 1;
    }
    while (&remaining % &five).is_zero() && !remaining.is_zero() {
        remaining /= &five;
        fives += 1;
    }

    if remaining.is_one() {
        Some(std::cmp::max(twos, fives))
    } else {
        None
    }
}
