//! HTTP surface for Summary Vault.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `GET /` – Liveness probe confirming that collaborator handles were constructed at startup.
//! - `POST /summarize` – Run one submission through the pipeline (validate, summarize, embed,
//!   persist) and return `{ "summary", "id", "message" }`.
//! - `GET /history` – Return recent stored records with embedding payloads stripped.
//! - `GET /metrics` – Observe submission and history counters.
//!
//! Validation faults map to `400` with a human-readable reason; collaborator faults map to
//! `500` carrying the underlying error text.

use crate::pipeline::{PipelineError, SummaryApi};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Build the HTTP router exposing the pipeline API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummaryApi + 'static,
{
    Router::new()
        .route("/", get(health_check))
        .route("/summarize", post(summarize_text::<S>))
        .route("/history", get(get_history::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Response body for the `GET /` health probe.
#[derive(Serialize)]
struct HealthResponse {
    /// Human-readable liveness marker.
    status: &'static str,
    /// Collaborator handles are constructed before the server binds, so a responding
    /// process always has its models loaded.
    models_loaded: bool,
}

/// Confirm the backend is up and its collaborators were initialized.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Backend is running",
        models_loaded: true,
    })
}

/// Request body for the `POST /summarize` endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Raw text to summarize, embed, and persist.
    text: String,
}

/// Success response for the `POST /summarize` endpoint.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Summary derived from the submitted text.
    summary: String,
    /// Identifier assigned to the stored record.
    id: String,
    /// Fixed confirmation message for interactive clients.
    message: &'static str,
}

/// Summarize a submission and persist it to the vector store.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummaryApi,
{
    let outcome = service.submit(request.text).await?;
    tracing::info!(id = %outcome.id, "Summarize request completed");
    Ok(Json(SummarizeResponse {
        summary: outcome.summary,
        id: outcome.id,
        message: "Saved to Vector DB",
    }))
}

/// Response body for `GET /history`.
#[derive(Serialize)]
struct HistoryResponse {
    /// Sanitized record set, or an empty list when the store holds nothing.
    history: Value,
}

/// Return recent records with embedding payloads stripped.
async fn get_history<S>(State(service): State<Arc<S>>) -> Result<Json<HistoryResponse>, AppError>
where
    S: SummaryApi,
{
    let history = service.history().await?;
    Ok(Json(HistoryResponse { history }))
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    submissions_stored: u64,
    history_requests: u64,
}

/// Return a concise metrics snapshot with submission and history counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Result<Json<MetricsResponse>, AppError>
where
    S: SummaryApi,
{
    let snapshot = service.metrics_snapshot();
    Ok(Json(MetricsResponse {
        submissions_stored: snapshot.submissions_stored,
        history_requests: snapshot.history_requests,
    }))
}

struct AppError(PipelineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_fault() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}
