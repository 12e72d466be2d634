//! Binary COPY bulk-load of validated measurement rows
//!
//! Large uploads are loaded through PostgreSQL's binary COPY protocol in one
//! streaming operation rather than one INSERT per row, which bounds write
//! latency for big files. The COPY runs on the ingest transaction's
//! connection, so it rolls back with everything else.

use deadpool_postgres::Transaction;
use futures::pin_mut;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::{ToSql, Type};
use tracing::debug;

use crate::app::models::MeasurementRow;
use crate::{Error, Result};

const COPY_ROWS_SQL: &str = "\
    COPY measurements (file_name, recorded_at, execution_time, value) \
    FROM STDIN (FORMAT BINARY)";

/// Stream a batch of rows into the measurements table.
///
/// Returns the number of rows the server accepted.
pub async fn copy_rows(
    transaction: &Transaction<'_>,
    file_name: &str,
    rows: &[MeasurementRow],
) -> Result<u64> {
    let sink = transaction
        .copy_in(COPY_ROWS_SQL)
        .await
        .map_err(|e| Error::storage("failed to open binary COPY stream", e))?;

    let writer = BinaryCopyInWriter::new(
        sink,
        &[Type::TEXT, Type::TIMESTAMPTZ, Type::FLOAT8, Type::FLOAT8],
    );
    pin_mut!(writer);

    for row in rows {
        writer
            .as_mut()
            .write(&[
                &file_name as &(dyn ToSql + Sync),
                &row.recorded_at,
                &row.execution_time,
                &row.value,
            ])
            .await
            .map_err(|e| Error::storage("failed to write row to COPY stream", e))?;
    }

    let written = writer
        .finish()
        .await
        .map_err(|e| Error::storage("failed to finish binary COPY", e))?;

    debug!("bulk-loaded {} rows for '{}'", written, file_name);
    Ok(written)
}
