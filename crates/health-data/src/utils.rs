//! Shared parsing helpers used across the parser, profiler, cleaner and charts.
//!
//! Two numeric readings exist side by side:
//!
//! - **lenient** ([`parse_leading_float`]): the longest numeric prefix counts,
//!   so `"12 mmHg"` reads as `12`. Statistics, cleaning and charts use this.
//! - **strict** ([`parse_strict_number`]): the whole trimmed string must be a
//!   number and blank text reads as `0`. Type inference uses this.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Value;

// =============================================================================
// Numeric Parsing
// =============================================================================

static LEADING_FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("Invalid regex: leading float")
});

static DECIMAL_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)$")
        .expect("Invalid regex: decimal number")
});

static RADIX_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0(?:[xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)$").expect("Invalid regex: radix number")
});

fn parse_decimal(token: &str) -> Option<f64> {
    let (sign, magnitude) = match token.as_bytes().first() {
        Some(b'-') => (-1.0, &token[1..]),
        Some(b'+') => (1.0, &token[1..]),
        _ => (1.0, token),
    };
    if magnitude == "Infinity" {
        return Some(sign * f64::INFINITY);
    }
    magnitude.parse::<f64>().ok().map(|n| sign * n)
}

/// Read the longest numeric prefix of `s`, ignoring leading whitespace.
///
/// Returns `None` when no prefix is numeric.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(parse_leading_float("  98.6F"), Some(98.6));
/// assert_eq!(parse_leading_float("1e3 ml"), Some(1000.0));
/// assert_eq!(parse_leading_float("n/a"), None);
/// ```
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    LEADING_FLOAT
        .find(trimmed)
        .and_then(|m| parse_decimal(m.as_str()))
}

/// Read the whole trimmed string as a number.
///
/// Blank text is `0`. Decimal, exponent, `Infinity` and `0x`/`0o`/`0b`
/// literals are accepted; anything else is `None`.
pub fn parse_strict_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if DECIMAL_NUMBER.is_match(trimmed) {
        return parse_decimal(trimmed);
    }
    if RADIX_NUMBER.is_match(trimmed) {
        let radix = match trimmed.as_bytes()[1] {
            b'x' | b'X' => 16,
            b'o' | b'O' => 8,
            _ => 2,
        };
        return u128::from_str_radix(&trimmed[2..], radix)
            .ok()
            .map(|n| n as f64);
    }
    None
}

/// Whether a raw field reads as a finite number under both readings.
///
/// This is the test the delimited-text parser applies to every field and to
/// the first line when deciding whether it is a header.
pub fn parse_numeric_field(s: &str) -> Option<f64> {
    let lenient = parse_leading_float(s)?;
    match parse_strict_number(s) {
        Some(strict) if strict.is_finite() => Some(lenient),
        _ => None,
    }
}

// =============================================================================
// Date Parsing
// =============================================================================

static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?\d{4,6})(?:-(\d{2}))?$").expect("Invalid regex: year-month")
});

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse common date and datetime spellings into a UTC timestamp.
///
/// Datetimes without an offset are read as UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    let caps = YEAR_MONTH.captures(trimmed)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Epoch milliseconds of a cell used as a time axis.
///
/// Numbers are taken as epoch milliseconds; text goes through [`parse_date`].
/// Missing and boolean cells have no timestamp.
pub fn value_to_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n as i64),
        Value::Text(s) => parse_date(s).map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("42"), Some(42.0));
        assert_eq!(parse_leading_float("  -3.5kg"), Some(-3.5));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_leading_float("2024-01-05"), Some(2024.0));
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float("inf"), None);
    }

    #[test]
    fn test_parse_strict_number() {
        assert_eq!(parse_strict_number("42"), Some(42.0));
        assert_eq!(parse_strict_number(" 4.2e1 "), Some(42.0));
        assert_eq!(parse_strict_number(""), Some(0.0));
        assert_eq!(parse_strict_number("   "), Some(0.0));
        assert_eq!(parse_strict_number("0x1F"), Some(31.0));
        assert_eq!(parse_strict_number("12abc"), None);
        assert_eq!(parse_strict_number("NaN"), None);
        assert_eq!(parse_strict_number("infinity"), None);
        assert_eq!(parse_strict_number("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn test_parse_numeric_field() {
        assert_eq!(parse_numeric_field("7"), Some(7.0));
        assert_eq!(parse_numeric_field("-0.25"), Some(-0.25));
        assert_eq!(parse_numeric_field(""), None);
        assert_eq!(parse_numeric_field("Infinity"), None);
        assert_eq!(parse_numeric_field("5 mg"), None);
        assert_eq!(parse_numeric_field("name"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc();

        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("2024/03/15"), Some(expected));
        assert_eq!(parse_date("03/15/2024"), Some(expected));
        assert_eq!(parse_date("March 15, 2024"), Some(expected));
        assert_eq!(parse_date("15 Mar 2024"), Some(expected));
        assert_eq!(parse_date("2024-03-15T00:00:00Z"), Some(expected));
        assert!(parse_date("2024-03-15 08:30:00").is_some());
        assert!(parse_date("2024-03").is_some());
    }

    #[test]
    fn test_parse_date_rejects_text() {
        assert_eq!(parse_date("hello"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn test_value_to_timestamp() {
        assert_eq!(value_to_timestamp(&Value::Number(1000.0)), Some(1000));
        assert_eq!(
            value_to_timestamp(&Value::from("1970-01-01T00:00:01Z")),
            Some(1000)
        );
        assert_eq!(value_to_timestamp(&Value::Null), None);
        assert_eq!(value_to_timestamp(&Value::from("soon")), None);
    }
}
