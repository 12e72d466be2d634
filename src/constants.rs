//! Application constants for the metrics ingestor
//!
//! This module contains the accepted input format, validation bounds,
//! and default values used throughout the service.

use chrono::{DateTime, Utc};

// =============================================================================
// Input Line Format
// =============================================================================

/// Field delimiter in uploaded files
pub const FIELD_DELIMITER: u8 = b';';

/// Exact number of fields per data line: timestamp, execution time, value
pub const EXPECTED_FIELD_COUNT: usize = 3;

/// chrono parse format for the accepted timestamp shape
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.fZ";

/// Strict shape of an accepted timestamp: exactly four fractional digits.
/// chrono's `%.f` accepts any fraction width, so the shape is pre-checked.
pub const TIMESTAMP_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}\.\d{4}Z$";

/// Human-readable timestamp pattern used in diagnostics
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "YYYY-MM-DDTHH-mm-ss.ffffZ";

/// Unix seconds for 2000-01-01T00:00:00Z, the earliest accepted timestamp
const MIN_TIMESTAMP_UNIX_SECONDS: i64 = 946_684_800;

/// Earliest timestamp accepted by the validator
pub fn min_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(MIN_TIMESTAMP_UNIX_SECONDS, 0).expect("constant is in range")
}

// =============================================================================
// Format Registry Defaults
// =============================================================================

/// File extensions handled by the CSV parser when none are configured
pub const DEFAULT_SUPPORTED_EXTENSIONS: &[&str] = &[".csv"];

// =============================================================================
// Read-back Limits
// =============================================================================

/// Number of latest raw rows returned when the caller does not ask for a count
pub const DEFAULT_LATEST_LIMIT: i64 = 10;

/// Smallest and largest accepted latest-rows counts; requests are clamped
pub const MIN_LATEST_LIMIT: i64 = 1;
pub const MAX_LATEST_LIMIT: i64 = 100;

/// Clamp a requested latest-rows count into the accepted range
pub fn clamp_latest_limit(requested: Option<i64>) -> i64 {
    match requested {
        None => DEFAULT_LATEST_LIMIT,
        Some(n) => n.clamp(MIN_LATEST_LIMIT, MAX_LATEST_LIMIT),
    }
}

// =============================================================================
// Server Defaults
// =============================================================================

/// Default bind address for the HTTP server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default maximum accepted upload size in bytes
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024; // 64MB

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_min_timestamp_is_millennium_start() {
        assert_eq!(
            min_timestamp(),
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_clamp_latest_limit() {
        assert_eq!(clamp_latest_limit(None), 10);
        assert_eq!(clamp_latest_limit(Some(25)), 25);
        assert_eq!(clamp_latest_limit(Some(0)), 1);
        assert_eq!(clamp_latest_limit(Some(-5)), 1);
        assert_eq!(clamp_latest_limit(Some(1000)), 100);
    }
}
