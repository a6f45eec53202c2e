//! Helpers for the `DD.MM.YYYY` dates guests type into the form.

use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

/// Length of a complete `DD.MM.YYYY` string.
pub const DATE_LENGTH: usize = 10;

const MAX_DIGITS: usize = 8;
const MIN_YEAR: i32 = 1900;
const MAX_YEARS_AHEAD: i32 = 100;

lazy_static! {
    static ref DATE_PATTERN: Regex = Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})$").unwrap();
}

/// Reshape raw keystrokes into a partial `DD.MM.YYYY` string.
///
/// Non-digits are dropped, input is capped at eight digits and the dots are
/// re-inserted after the day and month. Never rejects input.
pub fn normalize_keystrokes(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_DIGITS)
        .collect();

    let mut formatted = String::with_capacity(DATE_LENGTH);
    for (i, digit) in digits.chars().enumerate() {
        if i == 2 || i == 4 {
            formatted.push('.');
        }
        formatted.push(digit);
    }
    formatted
}

/// Parse a `DD.MM.YYYY` string into a calendar date.
///
/// Rejects malformed strings, out-of-range components and dates that do not
/// exist (e.g. `31.02.2024`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_date_with_max_year(value, Local::now().year() + MAX_YEARS_AHEAD)
}

fn parse_date_with_max_year(value: &str, max_year: i32) -> Option<NaiveDate> {
    let caps = DATE_PATTERN.captures(value)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    if year < MIN_YEAR || year > max_year {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (date.day() == day && date.month() == month && date.year() == year).then_some(date)
}

/// True if `value` is a complete, calendar-valid `DD.MM.YYYY` date.
pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// True if `value` is too short to be a complete date yet.
pub fn is_incomplete(value: &str) -> bool {
    value.chars().count() < DATE_LENGTH
}
