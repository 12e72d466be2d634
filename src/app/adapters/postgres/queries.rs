//! Read-side queries over stored aggregates and raw rows
//!
//! Pure data-access glue: filtered listing of aggregate records and the
//! latest-N raw rows for one file name. Nothing here mutates storage.

use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::app::models::{FileAggregate, MeasurementRow, StoredAggregate};
use crate::constants::clamp_latest_limit;
use crate::{Error, Result};

/// Optional range filters over the aggregates listing.
///
/// Each range is independent; a range whose `from` bound exceeds its `to`
/// bound is rejected by [`AggregateFilter::validate`] before any query runs.
#[derive(Debug, Clone, Default)]
pub struct AggregateFilter {
    /// Substring match on the file name
    pub file_name: Option<String>,
    /// Lower bound on the aggregate's earliest row timestamp
    pub min_recorded_from: Option<DateTime<Utc>>,
    /// Upper bound on the aggregate's earliest row timestamp
    pub min_recorded_to: Option<DateTime<Utc>>,
    /// Lower bound on the average value
    pub avg_value_from: Option<f64>,
    /// Upper bound on the average value
    pub avg_value_to: Option<f64>,
    /// Lower bound on the average execution time
    pub avg_execution_time_from: Option<f64>,
    /// Upper bound on the average execution time
    pub avg_execution_time_to: Option<f64>,
}

impl AggregateFilter {
    /// Check every range for inverted bounds; all violations are reported
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let (Some(from), Some(to)) = (self.min_recorded_from, self.min_recorded_to) {
            if from > to {
                errors.push("timestamp range start is after its end".to_string());
            }
        }
        if let (Some(from), Some(to)) = (self.avg_value_from, self.avg_value_to) {
            if from > to {
                errors.push("average value range start is above its end".to_string());
            }
        }
        if let (Some(from), Some(to)) = (self.avg_execution_time_from, self.avg_execution_time_to)
        {
            if from > to {
                errors.push("average execution time range start is above its end".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Fetch aggregate records matching the filter, newest first
pub async fn fetch_aggregates(
    pool: &Pool,
    filter: &AggregateFilter,
) -> Result<Vec<StoredAggregate>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

    if let Some(name) = &filter.file_name {
        params.push(name);
        conditions.push(format!("strpos(file_name, ${}) > 0", params.len()));
    }
    if let Some(from) = &filter.min_recorded_from {
        params.push(from);
        conditions.push(format!("min_recorded_at >= ${}", params.len()));
    }
    if let Some(to) = &filter.min_recorded_to {
        params.push(to);
        conditions.push(format!("min_recorded_at <= ${}", params.len()));
    }
    if let Some(from) = &filter.avg_value_from {
        params.push(from);
        conditions.push(format!("avg_value >= ${}", params.len()));
    }
    if let Some(to) = &filter.avg_value_to {
        params.push(to);
        conditions.push(format!("avg_value <= ${}", params.len()));
    }
    if let Some(from) = &filter.avg_execution_time_from {
        params.push(from);
        conditions.push(format!("avg_execution_time >= ${}", params.len()));
    }
    if let Some(to) = &filter.avg_execution_time_to {
        params.push(to);
        conditions.push(format!("avg_execution_time <= ${}", params.len()));
    }

    let mut sql = String::from(
        "SELECT id, file_name, min_recorded_at, max_recorded_at, span_seconds, \
         avg_execution_time, avg_value, median_value, min_value, max_value, created_at \
         FROM file_aggregates",
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let client = pool.get().await?;
    let rows = client
        .query(sql.as_str(), &params)
        .await
        .map_err(|e| Error::storage("failed to query aggregates", e))?;

    rows.iter().map(stored_aggregate_from_row).collect()
}

/// Fetch the latest rows for one file name, newest timestamp first.
///
/// The requested count is clamped into the accepted range. A file name with
/// no stored aggregate is an error even if stray raw rows exist for it.
pub async fn fetch_latest_values(
    pool: &Pool,
    file_name: &str,
    requested: Option<i64>,
) -> Result<Vec<MeasurementRow>> {
    let limit = clamp_latest_limit(requested);
    let client = pool.get().await?;

    let exists = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM file_aggregates WHERE file_name = $1)",
            &[&file_name],
        )
        .await
        .map_err(|e| Error::storage("failed to check for aggregate record", e))?
        .try_get::<_, bool>(0)?;
    if !exists {
        return Err(Error::unknown_file(file_name));
    }

    let rows = client
        .query(
            "SELECT recorded_at, execution_time, value FROM measurements \
             WHERE file_name = $1 ORDER BY recorded_at DESC LIMIT $2",
            &[&file_name, &limit],
        )
        .await
        .map_err(|e| Error::storage("failed to query latest rows", e))?;

    rows.iter()
        .map(|row| {
            Ok(MeasurementRow {
                recorded_at: row.try_get("recorded_at")?,
                execution_time: row.try_get("execution_time")?,
                value: row.try_get("value")?,
            })
        })
        .collect()
}

fn stored_aggregate_from_row(row: &Row) -> Result<StoredAggregate> {
    Ok(StoredAggregate {
        id: row.try_get("id")?,
        aggregate: FileAggregate {
            file_name: row.try_get("file_name")?,
            min_recorded_at: row.try_get("min_recorded_at")?,
            max_recorded_at: row.try_get("max_recorded_at")?,
            span_seconds: row.try_get("span_seconds")?,
            avg_execution_time: row.try_get("avg_execution_time")?,
            avg_value: row.try_get("avg_value")?,
            median_value: row.try_get("median_value")?,
            min_value: row.try_get("min_value")?,
            max_value: row.try_get("max_value")?,
            created_at: row.try_get("created_at")?,
        },
    })
}
