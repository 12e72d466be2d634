//! Tests for the record loop and per-line structural validation

use chrono::{TimeZone, Utc};

use super::{csv_parser, line_with};
use crate::Error;
use crate::app::services::format_registry::FileFormat;

#[test]
fn test_parses_valid_lines_in_file_order() {
    let input = "2025-01-01T00-00-00.0000Z;1.5;10.0\n\
                 2025-01-02T12-30-45.1234Z;2.25;20.5\n\
                 2025-01-03T23-59-59.9999Z;0;0\n";

    let rows = csv_parser().parse_reader(input.as_bytes()).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0].recorded_at,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(rows[0].execution_time, 1.5);
    assert_eq!(rows[0].value, 10.0);
    assert_eq!(rows[1].execution_time, 2.25);
    assert_eq!(rows[1].value, 20.5);
    assert_eq!(rows[2].execution_time, 0.0);
    assert_eq!(rows[2].value, 0.0);
}

#[test]
fn test_fractional_seconds_are_preserved() {
    let input = "2025-01-02T12-30-45.1234Z;1;1\n";
    let rows = csv_parser().parse_reader(input.as_bytes()).unwrap();

    let expected = Utc.with_ymd_and_hms(2025, 1, 2, 12, 30, 45).unwrap()
        + chrono::Duration::microseconds(123_400);
    assert_eq!(rows[0].recorded_at, expected);
}

#[test]
fn test_missing_trailing_newline_is_accepted() {
    let input = line_with("1.0", "2.0");
    let rows = csv_parser().parse_reader(input.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_wrong_field_count_reports_line_and_counts() {
    let input = "2025-01-01T00-00-00.0000Z;1.5;10.0\n\
                 2025-01-02T00-00-00.0000Z;1.5\n";

    let err = csv_parser().parse_reader(input.as_bytes()).unwrap_err();
    assert_eq!(err.to_string(), "line 2: expected 3 fields, got 2");
}

#[test]
fn test_extra_field_rejected() {
    let input = "2025-01-01T00-00-00.0000Z;1.5;10.0;surplus\n";

    let err = csv_parser().parse_reader(input.as_bytes()).unwrap_err();
    assert_eq!(err.to_string(), "line 1: expected 3 fields, got 4");
}

#[test]
fn test_empty_field_rejected() {
    let input = "2025-01-01T00-00-00.0000Z;   ;10.0\n";

    let err = csv_parser().parse_reader(input.as_bytes()).unwrap_err();
    assert_eq!(err.to_string(), "line 1: empty field");
}

#[test]
fn test_first_invalid_line_aborts_the_file() {
    // Line 2 is bad; line 3 is valid but must never be reached
    let input = "2025-01-01T00-00-00.0000Z;1.5;10.0\n\
                 2025-01-02T00-00-00.0000Z;-1;10.0\n\
                 2025-01-03T00-00-00.0000Z;1.5;10.0\n";

    let err = csv_parser().parse_reader(input.as_bytes()).unwrap_err();
    match err {
        Error::Validation { line, .. } => assert_eq!(line, 2),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_empty_input_is_rejected() {
    let err = csv_parser().parse_reader("".as_bytes()).unwrap_err();
    assert!(matches!(err, Error::EmptyFile));
}

#[test]
fn test_blank_lines_only_is_rejected() {
    let err = csv_parser().parse_reader("\n\n\n".as_bytes()).unwrap_err();
    assert!(matches!(err, Error::EmptyFile));
}

#[test]
fn test_line_numbers_skip_blank_lines() {
    // The bad record sits on physical line 3
    let input = "2025-01-01T00-00-00.0000Z;1.5;10.0\n\
                 \n\
                 2025-01-02T00-00-00.0000Z;bad;10.0\n";

    let err = csv_parser().parse_reader(input.as_bytes()).unwrap_err();
    match err {
        Error::Validation { line, .. } => assert_eq!(line, 3),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_whitespace_around_fields_is_trimmed() {
    let input = " 2025-01-01T00-00-00.0000Z ; 1.5 ; 10.0 \n";
    let rows = csv_parser().parse_reader(input.as_bytes()).unwrap();
    assert_eq!(rows[0].execution_time, 1.5);
    assert_eq!(rows[0].value, 10.0);
}

#[test]
fn test_can_parse_matches_extension_case_insensitively() {
    let parser = csv_parser();
    assert!(parser.can_parse("report.csv"));
    assert!(parser.can_parse("REPORT.CSV"));
    assert!(!parser.can_parse("report.txt"));
    assert!(!parser.can_parse("report"));
}

#[test]
fn test_parse_trait_entry_point_matches_reader() {
    let input = line_with("1.5", "10.0");
    let via_trait = csv_parser().parse(input.as_bytes()).unwrap();
    let via_reader = csv_parser().parse_reader(input.as_bytes()).unwrap();
    assert_eq!(via_trait, via_reader);
}
