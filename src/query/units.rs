//! Duration literal normalization.
//!
//! Duration-typed columns store nanoseconds. Values may carry a unit suffix
//! (`ns`, `us`, `ms`, `s`, case-sensitive, no space) and an optional decimal
//! fraction; they are rewritten to an integer count of nanoseconds.

use crate::core::{Result, SearchError};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{eof, opt, recognize, value},
    sequence::{pair, terminated, tuple},
    IResult,
};

/// Duration units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl DurationUnit {
    /// Nanoseconds per unit
    pub fn factor(&self) -> u64 {
        match self {
            DurationUnit::Nanoseconds => 1,
            DurationUnit::Microseconds => 1_000,
            DurationUnit::Milliseconds => 1_000_000,
            DurationUnit::Seconds => 1_000_000_000,
        }
    }
}

/// Rewrite `literal` as nanoseconds.
///
/// A literal without a suffix must still be numeric and is returned
/// unchanged. `key` only labels errors.
pub fn normalize_duration(key: &str, literal: &str) -> Result<String> {
    let (_, (whole, fraction, unit)) = duration_literal(literal).map_err(|_| {
        SearchError::invalid_value(key, format!("'{}' is not a duration", literal))
    })?;

    let Some(unit) = unit else {
        return Ok(literal.to_string());
    };

    let nanos = to_nanos(whole, fraction, unit).ok_or_else(|| {
        SearchError::invalid_value(
            key,
            format!("'{}' is out of range or finer than a nanosecond", literal),
        )
    })?;

    Ok(nanos.to_string())
}

fn to_nanos(whole: &str, fraction: Option<&str>, unit: DurationUnit) -> Option<u64> {
    let factor = u128::from(unit.factor());
    let whole: u128 = whole.parse().ok()?;
    let mut total = whole.checked_mul(factor)?;

    if let Some(fraction) = fraction {
        let fraction = fraction.trim_end_matches('0');
        // Anything past nine digits cannot be a whole nanosecond
        if fraction.len() > 9 {
            return None;
        }
        if !fraction.is_empty() {
            let scale = 10u128.pow(fraction.len() as u32);
            let numerator = fraction.parse::<u128>().ok()? * factor;
            if numerator % scale != 0 {
                return None;
            }
            total = total.checked_add(numerator / scale)?;
        }
    }

    u64::try_from(total).ok()
}

/// Parse `digits[.digits][unit]` spanning the whole input
fn duration_literal(input: &str) -> IResult<&str, (&str, Option<&str>, Option<DurationUnit>)> {
    let (input, (whole, fraction, unit)) = terminated(
        tuple((
            recognize(digit1),
            opt(pair(char('.'), digit1)),
            opt(duration_unit),
        )),
        eof,
    )(input)?;

    Ok((input, (whole, fraction.map(|(_, digits)| digits), unit)))
}

/// Parse duration units
fn duration_unit(input: &str) -> IResult<&str, DurationUnit> {
    alt((
        value(DurationUnit::Nanoseconds, tag("ns")),
        value(DurationUnit::Microseconds, tag("us")),
        value(DurationUnit::Milliseconds, tag("ms")),
        value(DurationUnit::Seconds, tag("s")),
    ))(input)
}
