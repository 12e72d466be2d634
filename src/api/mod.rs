//! HTTP boundary for the ingestion service
//!
//! Thin glue over the core: decodes a multipart upload into a byte stream for
//! the pipeline, re-serializes results as JSON, and maps errors to statuses.
//! Client-caused failures are 400 with a JSON body; unexpected failures are
//! 500 with a generic JSON body, with full detail in the log only.

pub mod dto;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

pub use handlers::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/files/upload", post(handlers::upload_file))
        .route("/api/files/results", get(handlers::get_results))
        .route(
            "/api/files/:file_name/values/latest",
            get(handlers::get_latest_values),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
