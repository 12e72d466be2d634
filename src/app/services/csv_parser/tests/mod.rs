//! Test utilities shared across the CSV parser test modules

use crate::app::services::csv_parser::CsvMeasurementParser;

mod parser_tests;

/// Parser configured with the default extension list
pub fn csv_parser() -> CsvMeasurementParser {
    CsvMeasurementParser::new(vec![".csv".to_string()])
}

/// A data line with a fixed valid timestamp and the given numeric fields
pub fn line_with(execution_time: &str, value: &str) -> String {
    format!("2025-01-01T10-30-00.0000Z;{};{}", execution_time, value)
}
