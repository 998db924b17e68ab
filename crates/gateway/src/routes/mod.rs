pub mod analysis;
pub mod system;

use crate::metrics::track_requests;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use inference::InferenceBackend;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router<B: InferenceBackend>(state: Arc<AppState<B>>) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health::<B>))
        .route("/metrics", get(system::metrics::<B>))
        .route("/metrics/reset", post(system::reset_metrics::<B>))
        .route("/analyze", post(analysis::analyze::<B>))
        .route("/detect", post(analysis::detect::<B>))
        .route("/segment", post(analysis::segment::<B>))
        .route("/count", post(analysis::count::<B>))
        .route("/congestion", post(analysis::congestion::<B>))
        .route("/violations", post(analysis::violations::<B>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
