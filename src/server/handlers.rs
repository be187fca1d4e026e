use super::error::ApiError;
use super::types::{DetectionRequest, DetectionResponse, DocumentResult, HealthResponse, DEFAULT_VERSION};
use super::AppState;
use crate::segment::split_document_by_length;
use crate::trace::TraceContext;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use futures::future::try_join_all;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.stats.as_ref().map(|s| s.snapshot()).unwrap_or_default();
    let status = if state.gate.is_closed() { "unavailable" } else { "ok" };
    Json(HealthResponse {
        status: status.to_string(),
        batches: snapshot.batches,
        items: snapshot.items,
    })
}

/// `POST /predit/text`: classify every fixed-length segment of a document.
pub async fn detect_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<DetectionRequest>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let ctx = TraceContext::new_root();
    let scan_id = ctx.id().to_string();
    tracing::debug!(
        scan_id = %scan_id,
        has_api_key = headers.contains_key("x-api-key"),
        multilingual = request.multilingual,
        "detection request"
    );
    ctx.debug(&format!(
        "received request, length={}",
        request.document.chars().count()
    ));

    let segments = split_document_by_length(&request.document, state.segment_length)?;
    let results = try_join_all(
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| state.gate.submit(segment.clone(), ctx.tag("id", i))),
    )
    .await?;

    let documents = segments
        .into_iter()
        .zip(results)
        .map(|(original_paragraph, result)| DocumentResult {
            label: result.label,
            score: result.score,
            original_paragraph,
        })
        .collect();
    ctx.debug("completed");

    Ok(Json(DetectionResponse {
        version: request.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        scan_id,
        documents,
    }))
}
