//! ISO-8601 duration parsing for policy timeouts.
//!
//! Accepts `PnYnMnWnDTnHnMnS`. Components must appear in that order, each at
//! most once. Any component may carry a decimal fraction (`.` or `,`).
//! Calendar units are fixed-length: a year is 365 days, a month 30 days.
//! Durations longer than [`MAX_DURATION`] are rejected so that a deadline
//! computed from one always fits in an `Instant`.

use std::time::Duration;

use crate::error::{Result, WaitError};

const NANOS_PER_SEC: u128 = 1_000_000_000;
const SECS_PER_MINUTE: u128 = 60;
const SECS_PER_HOUR: u128 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u128 = 24 * SECS_PER_HOUR;

/// Longest accepted duration: 100 years of 365 days.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Parses an ISO-8601 duration such as `PT3M` or `PT0.05S`.
///
/// # Errors
/// Returns [`WaitError::Config`] naming the input if it is not a valid duration.
pub fn parse_iso8601(input: &str) -> Result<Duration> {
    let malformed =
        |reason: &str| WaitError::config(format!("malformed ISO-8601 duration {input:?}: {reason}"));

    let body = input
        .trim()
        .strip_prefix('P')
        .ok_or_else(|| malformed("must start with 'P'"))?;

    let mut total: u128 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut last_rank = 0u8;

    for c in body.chars() {
        match c {
            '0'..='9' | '.' | ',' => number.push(c),
            'T' => {
                if in_time || !number.is_empty() {
                    return Err(malformed("misplaced 'T'"));
                }
                in_time = true;
            }
            designator => {
                let (rank, unit_secs) = unit(designator, in_time)
                    .ok_or_else(|| malformed(&format!("unknown designator '{designator}'")))?;
                if number.is_empty() {
                    return Err(malformed(&format!("'{designator}' has no value")));
                }
                if rank <= last_rank {
                    return Err(malformed("components out of order"));
                }
                let nanos = scaled_nanos(&number, unit_secs)
                    .ok_or_else(|| malformed(&format!("bad number {number:?}")))?;
                total = total
                    .checked_add(nanos)
                    .ok_or_else(|| malformed("overflow"))?;
                number.clear();
                last_rank = rank;
            }
        }
    }

    if !number.is_empty() {
        return Err(malformed("trailing number without designator"));
    }
    if last_rank == 0 {
        return Err(malformed("no components"));
    }
    if in_time && last_rank < 5 {
        return Err(malformed("'T' without time components"));
    }

    if total > MAX_DURATION.as_nanos() {
        return Err(malformed("exceeds the maximum of 100 years"));
    }
    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| malformed("overflow"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Ordering rank and length in seconds of a designator.
fn unit(designator: char, in_time: bool) -> Option<(u8, u128)> {
    match (designator, in_time) {
        ('Y', false) => Some((1, 365 * SECS_PER_DAY)),
        ('M', false) => Some((2, 30 * SECS_PER_DAY)),
        ('W', false) => Some((3, 7 * SECS_PER_DAY)),
        ('D', false) => Some((4, SECS_PER_DAY)),
        ('H', true) => Some((5, SECS_PER_HOUR)),
        ('M', true) => Some((6, SECS_PER_MINUTE)),
        ('S', true) => Some((7, 1)),
        _ => None,
    }
}

/// Converts `"<whole>[.<frac>]"` units of `unit_secs` seconds to nanoseconds.
fn scaled_nanos(number: &str, unit_secs: u128) -> Option<u128> {
    let (whole, frac) = match number.find(['.', ',']) {
        Some(idx) => (&number[..idx], &number[idx + 1..]),
        None => (number, ""),
    };
    if whole.is_empty() || frac.contains(['.', ',']) {
        return None;
    }
    if number.len() > whole.len() && frac.is_empty() {
        return None;
    }

    let whole: u128 = whole.parse().ok()?;
    // Sub-nanosecond digits are dropped.
    let digits: String = frac.chars().take(9).collect();
    let frac_nanos: u128 = if digits.is_empty() {
        0
    } else {
        let padded = format!("{digits:0<9}");
        padded.parse().ok()?
    };

    whole
        .checked_mul(unit_secs)?
        .checked_mul(NANOS_PER_SEC)?
        .checked_add(frac_nanos.checked_mul(unit_secs)?)
}
