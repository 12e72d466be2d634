//! Request handlers for upload and read-back endpoints

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deadpool_postgres::Pool;
use tracing::{error, info};

use super::dto::{
    ErrorBody, FilterErrors, LatestQuery, ProcessedRow, ResultsQuery, UploadResponse,
};
use crate::app::adapters::postgres::queries;
use crate::app::services::ingest_pipeline::IngestPipeline;

/// Shared state handed to every request handler
pub struct AppState {
    pub pipeline: IngestPipeline,
    pub pool: Pool,
}

/// One decoded multipart upload
struct Upload {
    file_name: String,
    data: Vec<u8>,
}

/// `POST /api/files/upload` — ingest one file, replacing any previous data
/// stored under its name. 400 with the rejection envelope on any
/// client-caused failure, 200 with the committed rows otherwise.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return rejected_response("no file provided or file is empty".to_string());
        }
        Err(response) => return response,
    };

    match state.pipeline.ingest(&upload.file_name, &upload.data).await {
        Ok(summary) => {
            info!(
                "upload '{}' committed with {} rows",
                summary.file_name,
                summary.row_count()
            );
            (StatusCode::OK, Json(UploadResponse::committed(&summary))).into_response()
        }
        Err(e) if e.is_client_error() => rejected_response(e.to_string()),
        Err(e) => {
            error!("upload '{}' failed: {:?}", upload.file_name, e);
            internal_error_response()
        }
    }
}

/// `GET /api/files/results` — filtered aggregate listing, newest first.
/// Inverted range filters are a 400 listing every violated range.
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResultsQuery>,
) -> Response {
    let filter = query.into_filter();
    if let Err(errors) = filter.validate() {
        return (StatusCode::BAD_REQUEST, Json(FilterErrors { errors })).into_response();
    }

    match queries::fetch_aggregates(&state.pool, &filter).await {
        Ok(aggregates) => {
            info!("returned {} aggregate records", aggregates.len());
            Json(aggregates).into_response()
        }
        Err(e) => {
            error!("aggregates query failed: {:?}", e);
            internal_error_response()
        }
    }
}

/// `GET /api/files/{file_name}/values/latest?n=` — latest raw rows for one
/// file name, newest first, count clamped to the accepted range. A file name
/// with no stored aggregate is a 400.
pub async fn get_latest_values(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    Query(query): Query<LatestQuery>,
) -> Response {
    match queries::fetch_latest_values(&state.pool, &file_name, query.n).await {
        Ok(rows) => {
            info!("returned {} latest rows for '{}'", rows.len(), file_name);
            let rows: Vec<ProcessedRow> = rows.iter().map(ProcessedRow::from).collect();
            Json(rows).into_response()
        }
        Err(e) if e.is_client_error() => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                message: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("latest rows query for '{}' failed: {:?}", file_name, e);
            internal_error_response()
        }
    }
}

/// Pull the first file field out of the multipart body.
///
/// `Ok(None)` means no usable file field arrived; an `Err` is a ready-made
/// 400 response for an unreadable body.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, Response> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field.bytes().await.map_err(|e| {
                    rejected_response(format!("failed to read upload: {}", e))
                })?;
                if data.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Upload {
                    file_name,
                    data: data.to_vec(),
                }));
            }
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(rejected_response(format!("malformed multipart body: {}", e)));
            }
        }
    }
}

fn rejected_response(error: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(UploadResponse::rejected(error)),
    )
        .into_response()
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: "internal server error".to_string(),
        }),
    )
        .into_response()
}
