//! Aggregate statistics over a validated row batch
//!
//! Given the batch a file was just uploaded with, computes the single
//! aggregate record stored alongside it: timestamp extrema and span, mean
//! execution time, and mean/median/min/max of the value field. The
//! computation is a pure function of the batch; it is recomputed from scratch
//! on every upload, never updated incrementally.

use chrono::Utc;

use crate::app::models::{FileAggregate, MeasurementRow};
use crate::{Error, Result};

/// Compute the aggregate for a non-empty batch.
///
/// The parser rejects empty files, so an empty batch here is a caller bug;
/// it is reported as the empty-file error rather than a panic.
pub fn aggregate_batch(file_name: &str, rows: &[MeasurementRow]) -> Result<FileAggregate> {
    if rows.is_empty() {
        return Err(Error::EmptyFile);
    }

    let mut min_recorded_at = rows[0].recorded_at;
    let mut max_recorded_at = rows[0].recorded_at;
    let mut min_value = rows[0].value;
    let mut max_value = rows[0].value;
    let mut execution_time_sum = 0.0;
    let mut value_sum = 0.0;

    for row in rows {
        min_recorded_at = min_recorded_at.min(row.recorded_at);
        max_recorded_at = max_recorded_at.max(row.recorded_at);
        min_value = min_value.min(row.value);
        max_value = max_value.max(row.value);
        execution_time_sum += row.execution_time;
        value_sum += row.value;
    }

    let count = rows.len() as f64;
    let span = max_recorded_at - min_recorded_at;

    Ok(FileAggregate {
        file_name: file_name.to_string(),
        min_recorded_at,
        max_recorded_at,
        span_seconds: span.num_microseconds().map_or_else(
            || span.num_seconds() as f64,
            |micros| micros as f64 / 1_000_000.0,
        ),
        avg_execution_time: execution_time_sum / count,
        avg_value: value_sum / count,
        median_value: median(rows.iter().map(|row| row.value).collect()),
        min_value,
        max_value,
        created_at: Utc::now(),
    })
}

/// Standard median: the middle value after an ascending sort, or the average
/// of the two middle values when the count is even
fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);

    let count = values.len();
    if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn row(day: u32, execution_time: f64, value: f64) -> MeasurementRow {
        MeasurementRow {
            recorded_at: Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap(),
            execution_time,
            value,
        }
    }

    #[test]
    fn test_singleton_batch() {
        let rows = vec![row(1, 1.5, 10.0)];
        let aggregate = aggregate_batch("single.csv", &rows).unwrap();

        assert_eq!(aggregate.file_name, "single.csv");
        assert_eq!(aggregate.min_recorded_at, rows[0].recorded_at);
        assert_eq!(aggregate.max_recorded_at, rows[0].recorded_at);
        assert_eq!(aggregate.span_seconds, 0.0);
        assert_eq!(aggregate.avg_execution_time, 1.5);
        assert_eq!(aggregate.avg_value, 10.0);
        assert_eq!(aggregate.median_value, 10.0);
        assert_eq!(aggregate.min_value, 10.0);
        assert_eq!(aggregate.max_value, 10.0);
    }

    #[test]
    fn test_extrema_and_span() {
        let rows = vec![row(3, 1.0, 5.0), row(1, 2.0, 7.0), row(2, 3.0, 6.0)];
        let aggregate = aggregate_batch("span.csv", &rows).unwrap();

        assert_eq!(
            aggregate.min_recorded_at,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            aggregate.max_recorded_at,
            Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap()
        );
        // Two whole days
        assert_eq!(aggregate.span_seconds, 172_800.0);
        assert_eq!(aggregate.min_value, 5.0);
        assert_eq!(aggregate.max_value, 7.0);
    }

    #[test]
    fn test_sub_second_span() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![
            MeasurementRow {
                recorded_at: base,
                execution_time: 1.0,
                value: 1.0,
            },
            MeasurementRow {
                recorded_at: base + chrono::Duration::microseconds(123_400),
                execution_time: 1.0,
                value: 1.0,
            },
        ];
        let aggregate = aggregate_batch("sub-second.csv", &rows).unwrap();
        assert!((aggregate.span_seconds - 0.1234).abs() < 1e-9);
    }

    #[test]
    fn test_means() {
        let rows = vec![row(1, 1.0, 10.0), row(2, 2.0, 20.0), row(3, 6.0, 60.0)];
        let aggregate = aggregate_batch("means.csv", &rows).unwrap();

        assert_eq!(aggregate.avg_execution_time, 3.0);
        assert_eq!(aggregate.avg_value, 30.0);
    }

    #[test]
    fn test_median_even_count_averages_middle_pair() {
        assert_eq!(median(vec![10.0, 20.5]), 15.25);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_odd_count_takes_middle() {
        assert_eq!(median(vec![1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(vec![9.0, 1.0, 5.0, 7.0, 3.0]), 5.0);
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        assert!(aggregate_batch("empty.csv", &[]).is_err());
    }
}
