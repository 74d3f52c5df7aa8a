//! Birthday countdown arithmetic.
//!
//! The contact app renders "N days until X's birthday" badges from the raw
//! `birth_date` strings stored in the contacts table. Bad data must degrade
//! to a quiet `0` instead of breaking rendering, so the string-level entry
//! point never fails.
//!
//! Date strings are `YYYY-MM-DD` (ASCII digits, hyphen separators). A day
//! that is valid in general (1-31) but too large for the target month rolls
//! into the following month, so a Feb 29 birthday resolves to Mar 1 in
//! non-leap years. Values outside 1-31 / 1-12 are rejected outright.

use chrono::{Datelike, Duration, NaiveDate};

/// Days from `today` until the next occurrence of the birthday in `raw`.
///
/// Returns `0` both for "the birthday is today" and for empty or malformed
/// input; callers that need to tell those apart use
/// [`try_days_until_birthday`].
///
/// `today` is a calendar date, so time-of-day is already stripped and the
/// whole-day difference is exact.
pub fn days_until_birthday(raw: &str, today: NaiveDate) -> i64 {
    try_days_until_birthday(raw, today).unwrap_or(0)
}

/// Strict variant: `None` for unparseable input, `Some(offset)` otherwise.
pub fn try_days_until_birthday(raw: &str, today: NaiveDate) -> Option<i64> {
    let next = next_birthday(raw, today)?;
    Some((next - today).num_days())
}

/// The calendar date of the next occurrence, or `None` for bad input.
pub fn next_birthday(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (_, month, day) = parse_date_parts(raw)?;

    let this_year = resolve_or_roll(today.year(), month, day)?;
    if this_year < today {
        // 今年的生日已過，移到明年
        resolve_or_roll(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

/// Split `YYYY-MM-DD` into integers. Exactly three hyphen-separated parts,
/// every part non-empty ASCII digits, month in 1-12, day in 1-31.
fn parse_date_parts(raw: &str) -> Option<(i32, u32, u32)> {
    let mut parts = raw.split('-');
    let year = parse_numeric(parts.next()?)?;
    let month = parse_numeric(parts.next()?)?;
    let day = parse_numeric(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    Some((year as i32, month, day))
}

fn parse_numeric(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Build `year-month-day`, rolling a too-large day into the next month the
/// way the web client's date constructor did (Feb 29 → Mar 1 off leap years).
fn resolve_or_roll(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some(date),
        None => NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| first + Duration::days(i64::from(day) - 1)),
    }
}
