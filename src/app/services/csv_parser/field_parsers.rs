//! Field parsing utilities for measurement records
//!
//! This module validates the three fields of a data line: the fixed-pattern
//! UTC timestamp and the two non-negative decimal fields. Every failure
//! carries the 1-based line number for the caller's diagnostic.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::constants::{
    TIMESTAMP_DISPLAY_FORMAT, TIMESTAMP_FORMAT, TIMESTAMP_PATTERN, min_timestamp,
};
use crate::{Error, Result};

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).expect("pattern is valid"))
}

/// Parse a timestamp in the fixed `YYYY-MM-DDTHH-mm-ss.ffffZ` pattern and
/// check it lies within `[2000-01-01T00:00:00Z, now]` inclusive.
pub fn parse_timestamp(line: u64, raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    // Shape check first: chrono's `%.f` accepts any fraction width, the
    // accepted pattern requires exactly four digits
    if !timestamp_pattern().is_match(raw) {
        return Err(Error::validation(
            line,
            format!(
                "invalid timestamp '{}', expected {}",
                raw, TIMESTAMP_DISPLAY_FORMAT
            ),
        ));
    }

    let naive = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|_| {
        Error::validation(
            line,
            format!(
                "invalid timestamp '{}', expected {}",
                raw, TIMESTAMP_DISPLAY_FORMAT
            ),
        )
    })?;
    let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);

    if timestamp < min_timestamp() {
        return Err(Error::validation(
            line,
            format!("timestamp '{}' is before 2000-01-01T00:00:00Z", raw),
        ));
    }
    if timestamp > now {
        return Err(Error::validation(
            line,
            format!("timestamp '{}' is in the future", raw),
        ));
    }

    Ok(timestamp)
}

/// Parse a non-negative finite decimal field
pub fn parse_non_negative(line: u64, raw: &str, field_name: &str) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|_| {
        Error::validation(line, format!("invalid {} '{}'", field_name, raw))
    })?;

    // `str::parse::<f64>` accepts "NaN" and "inf"; the row shape does not
    if !value.is_finite() {
        return Err(Error::validation(
            line,
            format!("invalid {} '{}'", field_name, raw),
        ));
    }
    if value < 0.0 {
        return Err(Error::validation(
            line,
            format!("{} must be non-negative, got {}", field_name, raw),
        ));
    }

    Ok(value)
}
