//! Ingestion pipeline coordinating parse, lock, replace, and aggregate
//!
//! This module owns the write path for uploaded files. An upload moves through
//! a fixed sequence: resolve a parser, parse and validate, then inside one
//! transaction under a per-file advisory lock delete the file's previous rows
//! and aggregate, bulk-load the new batch over the binary COPY path, and store
//! the freshly computed aggregate. Any failure after the transaction opens
//! rolls the whole sequence back; no partial state is ever visible.
//!
//! ## Architecture
//!
//! - [`pipeline`] - The orchestrator and its transaction/lock discipline
//! - [`bulk`] - Binary COPY bulk-load of validated rows

pub mod bulk;
pub mod pipeline;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use pipeline::IngestPipeline;
