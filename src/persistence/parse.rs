//! Tolerant parsing of persisted numeric and date text
//!
//! Persisted values may carry locale-specific separators. Anything that
//! cannot be read degrades to a default (0, or a fallback date) rather than
//! an error.

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::warn;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Parse a number, accepting `1.234,56` style text
///
/// Text containing a comma is read with `.` as thousands separator and `,`
/// as decimal separator. Blank or unreadable text yields `0.0`.
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let cleaned: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            warn!("Unreadable number {:?}; using 0", text);
            0.0
        }
    }
}

/// Parse a date; a trailing time component is ignored
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date()))
}

/// Parse a timestamp; a bare date is read as midnight
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a date, substituting `fallback` when the text is missing or unreadable
pub fn parse_date_or(text: &str, fallback: NaiveDate) -> NaiveDate {
    parse_date(text).unwrap_or_else(|| {
        warn!("Unreadable date {:?}; using {}", text, fallback);
        fallback
    })
}

/// Parse a date, substituting today's local date on failure
pub fn parse_date_or_today(text: &str) -> NaiveDate {
    parse_date_or(text, Local::now().date_naive())
}
