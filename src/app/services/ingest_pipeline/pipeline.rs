//! Orchestrator for the upload write path
//!
//! Coordinates the format registry, the parser, the aggregation engine, and
//! the storage engine. The pipeline itself is stateless across requests; all
//! shared mutable state lives behind the storage transaction.

use deadpool_postgres::Pool;
use tracing::{debug, info};

use super::bulk::copy_rows;
use crate::app::models::IngestSummary;
use crate::app::services::aggregator::aggregate_batch;
use crate::app::services::format_registry::FormatRegistry;
use crate::{Error, Result};

/// Transaction-scoped exclusive lock keyed by a hash of the file name.
/// Concurrent uploads of the same name queue here; different names do not
/// contend. `hashtext` collisions only cause spurious waiting, never
/// incorrect data.
const ACQUIRE_FILE_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext($1)::bigint)";

const DELETE_ROWS_SQL: &str = "DELETE FROM measurements WHERE file_name = $1";

const DELETE_AGGREGATE_SQL: &str = "DELETE FROM file_aggregates WHERE file_name = $1";

const INSERT_AGGREGATE_SQL: &str = "\
    INSERT INTO file_aggregates \
    (file_name, min_recorded_at, max_recorded_at, span_seconds, \
     avg_execution_time, avg_value, median_value, min_value, max_value, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

/// Upload orchestrator: parse, then transactionally replace a file's data
pub struct IngestPipeline {
    registry: FormatRegistry,
    pool: Pool,
}

impl IngestPipeline {
    /// Create a pipeline over a format registry and a connection pool
    pub fn new(registry: FormatRegistry, pool: Pool) -> Self {
        Self { registry, pool }
    }

    /// Process one uploaded file.
    ///
    /// A validation failure or unsupported file name returns before any
    /// connection is taken from the pool, so rejected uploads never touch
    /// storage. Once the transaction is open, every statement of this upload
    /// runs on its single reserved connection.
    pub async fn ingest(&self, file_name: &str, data: &[u8]) -> Result<IngestSummary> {
        // Unsupported names fail before parsing begins
        let format = self.registry.resolve(file_name)?;

        let rows = format.parse(data)?;
        debug!(
            "validated {} rows from upload '{}'",
            rows.len(),
            file_name
        );

        let mut client = self.pool.get().await?;
        let transaction = client.transaction().await?;

        // The lock is held until the transaction ends, by commit or rollback,
        // which totally orders the delete/copy/aggregate sequences of
        // concurrent uploads sharing this file name.
        transaction
            .execute(ACQUIRE_FILE_LOCK_SQL, &[&file_name])
            .await
            .map_err(|e| Error::storage("failed to acquire per-file lock", e))?;

        // Replace: drop whatever batch this file name held before
        let deleted = transaction
            .execute(DELETE_ROWS_SQL, &[&file_name])
            .await
            .map_err(|e| Error::storage("failed to delete previous rows", e))?;
        transaction
            .execute(DELETE_AGGREGATE_SQL, &[&file_name])
            .await
            .map_err(|e| Error::storage("failed to delete previous aggregate", e))?;
        if deleted > 0 {
            debug!("replaced {} previous rows for '{}'", deleted, file_name);
        }

        // Bulk-load the new batch, then store the aggregate recomputed from it
        copy_rows(&transaction, file_name, &rows).await?;

        let aggregate = aggregate_batch(file_name, &rows)?;
        transaction
            .execute(
                INSERT_AGGREGATE_SQL,
                &[
                    &aggregate.file_name,
                    &aggregate.min_recorded_at,
                    &aggregate.max_recorded_at,
                    &aggregate.span_seconds,
                    &aggregate.avg_execution_time,
                    &aggregate.avg_value,
                    &aggregate.median_value,
                    &aggregate.min_value,
                    &aggregate.max_value,
                    &aggregate.created_at,
                ],
            )
            .await
            .map_err(|e| Error::storage("failed to insert aggregate", e))?;

        // Every `?` above drops the transaction, rolling back the delete and
        // the copy together
        transaction
            .commit()
            .await
            .map_err(|e| Error::storage("failed to commit ingest transaction", e))?;

        info!("committed {} rows for '{}'", rows.len(), file_name);

        Ok(IngestSummary {
            file_name: file_name.to_string(),
            rows,
            aggregate,
        })
    }
}
