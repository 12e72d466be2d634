//! Metrics Ingestor Library
//!
//! A Rust service for ingesting semicolon-delimited time-series measurement
//! files into a TimescaleDB-backed PostgreSQL store.
//!
//! This library provides tools for:
//! - Streaming parse-and-validate of untrusted `timestamp;executionTime;value` rows
//! - Dispatching uploads to a capable parser via a format registry
//! - Computing per-file aggregate statistics (extrema, span, means, median)
//! - Transactional replace of a file's raw rows and aggregate under a
//!   per-file advisory lock, with a binary COPY bulk-load path
//! - Filtered read-back of aggregates and latest raw rows

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aggregator;
        pub mod csv_parser;
        pub mod format_registry;
        pub mod ingest_pipeline;
    }
    pub mod adapters {
        pub mod postgres;
    }
}

// HTTP boundary
pub mod api;

// Re-export commonly used types
pub use app::models::{FileAggregate, IngestSummary, MeasurementRow, StoredAggregate};
pub use config::AppConfig;

/// Result type alias for the metrics ingestor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ingestion, validation, and storage operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A data line failed validation; the line number is 1-based
    #[error("line {line}: {message}")]
    Validation { line: u64, message: String },

    /// The uploaded file contained no data lines
    #[error("file contains no data rows")]
    EmptyFile,

    /// No registered format can handle the file name
    #[error("unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// A read-side filter was self-contradictory (from bound above to bound)
    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    /// Raw rows were requested for a file name with no stored aggregate
    #[error("no results found for file '{file_name}'")]
    UnknownFile { file_name: String },

    /// A statement, transaction, or COPY operation failed
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// The connection pool could not hand out a connection
    #[error("connection pool error: {message}")]
    Pool {
        message: String,
        #[source]
        source: deadpool_postgres::PoolError,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a validation error for a specific data line
    pub fn validation(line: u64, message: impl Into<String>) -> Self {
        Self::Validation {
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported-format error from a file name's extension
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Create an invalid-filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create an unknown-file error
    pub fn unknown_file(file_name: impl Into<String>) -> Self {
        Self::UnknownFile {
            file_name: file_name.into(),
        }
    }

    /// Create a storage error with context
    pub fn storage(message: impl Into<String>, source: tokio_postgres::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Whether the error was caused by the client's input rather than the
    /// service or its storage. Client errors are safe to surface verbatim.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::EmptyFile
                | Self::UnsupportedFormat { .. }
                | Self::InvalidFilter { .. }
                | Self::UnknownFile { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<tokio_postgres::Error> for Error {
    fn from(error: tokio_postgres::Error) -> Self {
        Self::Storage {
            message: "database operation failed".to_string(),
            source: error,
        }
    }
}

impl From<deadpool_postgres::PoolError> for Error {
    fn from(error: deadpool_postgres::PoolError) -> Self {
        Self::Pool {
            message: "failed to acquire a database connection".to_string(),
            source: error,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
