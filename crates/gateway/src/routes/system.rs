use crate::metrics::MetricsSnapshot;
use crate::state::AppState;
use axum::{Json, extract::State};
use inference::InferenceBackend;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub detection_model_loaded: bool,
    pub segmentation_model_loaded: bool,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Traffic analytics API is running",
    })
}

/// GET /health - liveness plus per-model readiness
pub async fn health<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        detection_model_loaded: state.analyzer.detection_loaded(),
        segmentation_model_loaded: state.analyzer.segmentation_loaded(),
    })
}

/// GET /metrics
pub async fn metrics<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// POST /metrics/reset - returns the values held before zeroing
pub async fn reset_metrics<B: InferenceBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<MetricsSnapshot> {
    let previous = state.metrics.reset();
    tracing::info!(
        requests_total = previous.requests_total,
        errors_total = previous.errors_total,
        "Request metrics reset"
    );
    Json(previous)
}
