//! PostgreSQL storage adapter
//!
//! Owns pool construction and schema bootstrap for the two tables the
//! pipeline writes: the wide `measurements` table (no primary key, indexed
//! for time-range and per-file queries, converted to a TimescaleDB hypertable
//! when the extension is available) and the narrow `file_aggregates` table
//! (auto-increment primary key, one row per file name enforced by a
//! uniqueness constraint).

pub mod queries;

use std::str::FromStr;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::{Error, Result};

const CREATE_TABLES_SQL: &str = "\
    CREATE TABLE IF NOT EXISTS measurements (\
        file_name       TEXT NOT NULL,\
        recorded_at     TIMESTAMPTZ NOT NULL,\
        execution_time  DOUBLE PRECISION NOT NULL,\
        value           DOUBLE PRECISION NOT NULL\
    );\
    CREATE INDEX IF NOT EXISTS measurements_file_name_idx ON measurements (file_name);\
    CREATE TABLE IF NOT EXISTS file_aggregates (\
        id                  BIGSERIAL PRIMARY KEY,\
        file_name           TEXT NOT NULL UNIQUE,\
        min_recorded_at     TIMESTAMPTZ NOT NULL,\
        max_recorded_at     TIMESTAMPTZ NOT NULL,\
        span_seconds        DOUBLE PRECISION NOT NULL,\
        avg_execution_time  DOUBLE PRECISION NOT NULL,\
        avg_value           DOUBLE PRECISION NOT NULL,\
        median_value        DOUBLE PRECISION NOT NULL,\
        min_value           DOUBLE PRECISION NOT NULL,\
        max_value           DOUBLE PRECISION NOT NULL,\
        created_at          TIMESTAMPTZ NOT NULL\
    );";

const CREATE_HYPERTABLE_SQL: &str = "\
    CREATE EXTENSION IF NOT EXISTS timescaledb;\
    SELECT create_hypertable('measurements', 'recorded_at', \
        if_not_exists => TRUE, migrate_data => TRUE);";

const CREATE_TIME_INDEX_SQL: &str = "\
    CREATE INDEX IF NOT EXISTS measurements_recorded_at_idx \
    ON measurements (recorded_at DESC);";

/// Build a connection pool from the configured URL.
///
/// No connection is made here; connections are established lazily as the
/// pool hands them out.
pub fn connect_pool(config: &DatabaseConfig) -> Result<Pool> {
    let pg_config = tokio_postgres::Config::from_str(&config.url)
        .map_err(|e| Error::configuration(format!("invalid database URL: {}", e)))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Pool::builder(manager)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| Error::configuration(format!("failed to build connection pool: {}", e)))
}

/// Create tables and indexes, converting the raw table into a hypertable when
/// configured and the TimescaleDB extension is installed. Without the
/// extension the table falls back to a plain descending time index.
pub async fn init_schema(pool: &Pool, config: &DatabaseConfig) -> Result<()> {
    let client = pool.get().await?;

    client
        .batch_execute(CREATE_TABLES_SQL)
        .await
        .map_err(|e| Error::storage("failed to create schema", e))?;

    if config.create_hypertable {
        match client.batch_execute(CREATE_HYPERTABLE_SQL).await {
            Ok(()) => {
                info!("measurements table registered as a TimescaleDB hypertable");
                return Ok(());
            }
            Err(e) => {
                warn!(
                    "TimescaleDB unavailable, keeping a plain time index: {}",
                    e
                );
            }
        }
    }

    client
        .batch_execute(CREATE_TIME_INDEX_SQL)
        .await
        .map_err(|e| Error::storage("failed to create time index", e))?;

    Ok(())
}
