//! CSV parser for semicolon-delimited measurement files
//!
//! This module provides a fail-fast parser for the accepted upload format:
//! one `timestamp;executionTime;value` record per line, no header row. The
//! first invalid line aborts the whole file with a line-numbered diagnostic,
//! so a file is either accepted in full or rejected in full.
//!
//! ## Architecture
//!
//! - [`parser`] - Record loop, per-line structural checks, fail-fast control flow
//! - [`field_parsers`] - Timestamp and numeric field validation
//!
//! ## Usage
//!
//! ```rust
//! use metrics_ingestor::app::services::csv_parser::CsvMeasurementParser;
//!
//! # fn example() -> metrics_ingestor::Result<()> {
//! let parser = CsvMeasurementParser::new(vec![".csv".to_string()]);
//! let rows = parser.parse_reader("2025-01-01T10-00-00.0000Z;1.5;10.0\n".as_bytes())?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod field_parsers;
pub mod parser;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use parser::CsvMeasurementParser;
