use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use super::error::ApiError;
use super::state::AppState;
use crate::event::S3Event;
use crate::observability::MetricsSnapshot;
use crate::pipeline::BatchReport;

/// Ingest one event batch and run it through the pipeline
///
/// Returns 200 with the batch report regardless of how many records or
/// attachments failed; only a malformed payload is an HTTP error.
pub async fn ingest_events(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchReport>, ApiError> {
    let event: S3Event = serde_json::from_slice(&body)?;

    let records = event.into_records();
    tracing::info!(records = records.len(), "Event batch received");

    let report = state.pipeline.run(records).await;

    Ok(Json(report))
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
