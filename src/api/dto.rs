//! Request and response bodies for the HTTP boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::adapters::postgres::queries::AggregateFilter;
use crate::app::models::{IngestSummary, MeasurementRow};

/// Envelope returned by the upload endpoint, success or not
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub processed_rows: Vec<ProcessedRow>,
    pub errors: Vec<String>,
}

impl UploadResponse {
    /// Envelope for a committed upload
    pub fn committed(summary: &IngestSummary) -> Self {
        Self {
            success: true,
            message: "file processed successfully".to_string(),
            processed_rows: summary.rows.iter().map(ProcessedRow::from).collect(),
            errors: Vec::new(),
        }
    }

    /// Envelope for a rejected upload
    pub fn rejected(error: String) -> Self {
        Self {
            success: false,
            message: "file was not processed".to_string(),
            processed_rows: Vec::new(),
            errors: vec![error],
        }
    }
}

/// One committed row echoed back to the uploader
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRow {
    pub date: DateTime<Utc>,
    pub execution_time: f64,
    pub value: f64,
}

impl From<&MeasurementRow> for ProcessedRow {
    fn from(row: &MeasurementRow) -> Self {
        Self {
            date: row.recorded_at,
            execution_time: row.execution_time,
            value: row.value,
        }
    }
}

/// Query parameters of the aggregates listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub file_name: Option<String>,
    pub min_recorded_from: Option<DateTime<Utc>>,
    pub min_recorded_to: Option<DateTime<Utc>>,
    pub avg_value_from: Option<f64>,
    pub avg_value_to: Option<f64>,
    pub avg_execution_time_from: Option<f64>,
    pub avg_execution_time_to: Option<f64>,
}

impl ResultsQuery {
    pub fn into_filter(self) -> AggregateFilter {
        AggregateFilter {
            file_name: self.file_name,
            min_recorded_from: self.min_recorded_from,
            min_recorded_to: self.min_recorded_to,
            avg_value_from: self.avg_value_from,
            avg_value_to: self.avg_value_to,
            avg_execution_time_from: self.avg_execution_time_from,
            avg_execution_time_to: self.avg_execution_time_to,
        }
    }
}

/// Query parameters of the latest-rows listing
#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    pub n: Option<i64>,
}

/// Body of a 400 caused by bad filter parameters
#[derive(Debug, Serialize)]
pub struct FilterErrors {
    pub errors: Vec<String>,
}

/// Body of any error response that is not an upload envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::aggregator::aggregate_batch;
    use chrono::TimeZone;

    #[test]
    fn test_upload_envelope_round_trips_rows() {
        let rows = vec![MeasurementRow {
            recorded_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            execution_time: 1.5,
            value: 10.0,
        }];
        let aggregate = aggregate_batch("a.csv", &rows).unwrap();
        let summary = IngestSummary {
            file_name: "a.csv".to_string(),
            rows,
            aggregate,
        };

        let response = UploadResponse::committed(&summary);
        assert!(response.success);
        assert_eq!(response.processed_rows.len(), 1);
        assert_eq!(response.processed_rows[0].execution_time, 1.5);
        assert_eq!(response.processed_rows[0].value, 10.0);
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_rejected_envelope_carries_diagnostic() {
        let response = UploadResponse::rejected("line 2: empty field".to_string());
        assert!(!response.success);
        assert!(response.processed_rows.is_empty());
        assert_eq!(response.errors, vec!["line 2: empty field".to_string()]);
    }

    #[test]
    fn test_processed_row_uses_camel_case_wire_names() {
        let row = ProcessedRow {
            date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            execution_time: 1.5,
            value: 10.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("executionTime").is_some());
        assert!(json.get("date").is_some());
        assert!(json.get("value").is_some());
    }
}
