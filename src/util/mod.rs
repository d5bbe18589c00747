//! Small shared helpers: calendar dates and content normalization.

use chrono::{Local, NaiveDate};

use crate::error::{Result, VocabError};

/// On-disk date format (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored or user-supplied date.
///
/// Accepts plain dates as well as RFC 3339 timestamps (the date part is kept),
/// since older exports carried full timestamps.
///
/// # Errors
///
/// Returns a validation error naming `field` if the value is not a date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    Err(VocabError::validation(
        field,
        format!("expected YYYY-MM-DD, got '{trimmed}'"),
    ))
}

/// Key used for duplicate detection: trimmed and lower-cased.
#[must_use]
pub fn normalize_content(content: &str) -> String {
    content.trim().to_lowercase()
}
