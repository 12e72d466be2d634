//! Data models for measurement ingestion
//!
//! This module contains the core data structures for validated measurement
//! rows and the per-file aggregate statistics derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Measurement Rows
// =============================================================================

/// One validated `timestamp;executionTime;value` row from an uploaded file.
///
/// Rows have no identity of their own; they belong to the file name they were
/// uploaded under and are replaced wholesale when that file name is uploaded
/// again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRow {
    /// Start time of the measured run (UTC)
    pub recorded_at: DateTime<Utc>,

    /// Duration of the run in seconds; non-negative and finite
    pub execution_time: f64,

    /// Measured indicator value; non-negative and finite
    pub value: f64,
}

// =============================================================================
// Per-file Aggregates
// =============================================================================

/// Aggregate statistics recomputed from scratch over one file's row batch.
///
/// At most one aggregate exists per file name; the storage layer enforces this
/// with a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAggregate {
    /// Logical file name the batch was uploaded under
    pub file_name: String,

    /// Earliest row timestamp in the batch
    pub min_recorded_at: DateTime<Utc>,

    /// Latest row timestamp in the batch
    pub max_recorded_at: DateTime<Utc>,

    /// Seconds between the earliest and latest timestamps; zero for one row
    pub span_seconds: f64,

    /// Arithmetic mean of execution times
    pub avg_execution_time: f64,

    /// Arithmetic mean of values
    pub avg_value: f64,

    /// Median value (average of the two middle values for even counts)
    pub median_value: f64,

    /// Smallest value in the batch
    pub min_value: f64,

    /// Largest value in the batch
    pub max_value: f64,

    /// When this aggregate was computed
    pub created_at: DateTime<Utc>,
}

/// A persisted aggregate together with its storage-assigned identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAggregate {
    /// Auto-increment primary key assigned on insert
    pub id: i64,

    #[serde(flatten)]
    pub aggregate: FileAggregate,
}

// =============================================================================
// Pipeline Results
// =============================================================================

/// Outcome of a successfully committed ingestion run
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Logical file name the upload targeted
    pub file_name: String,

    /// The validated rows that now make up the file's stored batch, in file order
    pub rows: Vec<MeasurementRow>,

    /// The aggregate computed from those rows and stored alongside them
    pub aggregate: FileAggregate,
}

impl IngestSummary {
    /// Number of rows committed for the file
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
