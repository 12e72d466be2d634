//! Core CSV measurement parser implementation
//!
//! This module provides the record loop over semicolon-delimited input and the
//! per-line structural checks (field count, empty fields). Field-level type and
//! range validation lives in [`super::field_parsers`].

use std::io::Read;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::field_parsers::{parse_non_negative, parse_timestamp};
use crate::app::models::MeasurementRow;
use crate::app::services::format_registry::{FileFormat, file_extension};
use crate::constants::{EXPECTED_FIELD_COUNT, FIELD_DELIMITER};
use crate::{Error, Result};

/// Fail-fast parser for `timestamp;executionTime;value` files
///
/// The parser streams the input and validates each line in order. Validation
/// has no side effects: on rejection nothing downstream ever sees the rows
/// that parsed before the bad line.
#[derive(Debug, Clone)]
pub struct CsvMeasurementParser {
    extensions: Vec<String>,
}

impl CsvMeasurementParser {
    /// Create a parser that answers for the given file extensions
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Parse and validate an entire upload stream.
    ///
    /// Returns the rows in file order, or the diagnostic for the first invalid
    /// line. An input with zero data lines is rejected as empty.
    pub fn parse_reader<R: Read>(&self, input: R) -> Result<Vec<MeasurementRow>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        // The upper timestamp bound is captured once per parse run
        let now = Utc::now();

        let mut rows = Vec::new();
        let mut record = StringRecord::new();

        loop {
            // Physical 1-based line where the next record starts
            let line = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => rows.push(parse_record(&record, line, now)?),
                Ok(false) => break,
                Err(e) => {
                    let line = e.position().map_or(line, |p| p.line());
                    return Err(Error::validation(line, format!("malformed record: {}", e)));
                }
            }
        }

        if rows.is_empty() {
            return Err(Error::EmptyFile);
        }

        debug!("parsed {} measurement rows", rows.len());
        Ok(rows)
    }
}

impl FileFormat for CsvMeasurementParser {
    fn can_parse(&self, file_name: &str) -> bool {
        let extension = file_extension(file_name);
        self.extensions
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(&extension))
    }

    fn parse(&self, data: &[u8]) -> Result<Vec<MeasurementRow>> {
        self.parse_reader(data)
    }
}

/// Validate one record: field count, empty fields, then the three fields in order
fn parse_record(record: &StringRecord, line: u64, now: DateTime<Utc>) -> Result<MeasurementRow> {
    if record.len() != EXPECTED_FIELD_COUNT {
        return Err(Error::validation(
            line,
            format!(
                "expected {} fields, got {}",
                EXPECTED_FIELD_COUNT,
                record.len()
            ),
        ));
    }

    // Fields arrive trimmed, so whitespace-only collapses to empty
    if record.iter().any(|field| field.is_empty()) {
        return Err(Error::validation(line, "empty field"));
    }

    let recorded_at = parse_timestamp(line, &record[0], now)?;
    let execution_time = parse_non_negative(line, &record[1], "execution time")?;
    let value = parse_non_negative(line, &record[2], "value")?;

    Ok(MeasurementRow {
        recorded_at,
        execution_time,
        value,
    })
}
