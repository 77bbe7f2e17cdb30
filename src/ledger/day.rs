use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::LedgerError;

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Bucket a client-supplied date or timestamp into a calendar day.
///
/// Timestamps keep the calendar date as written in their own offset, so
/// `2024-01-05T23:59:00Z` and `2024-01-05T23:59:00-05:00` are both the 5th.
/// Time-of-day is dropped.
pub fn parse_day(raw: &str) -> Result<NaiveDate, LedgerError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LedgerError::InvalidDate(raw.to_string()));
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
        .ok_or_else(|| LedgerError::InvalidDate(raw.to_string()))
}
