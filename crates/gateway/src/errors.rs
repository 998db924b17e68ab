use crate::pipeline::PipelineError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use inference::InferenceError;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Request-level failure, rendered as `{"detail": ...}` with a matching status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Uploaded file exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("The {0} model is not loaded")]
    ModelUnavailable(&'static str),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Inference timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Inference(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ModelUnavailable(model) => AppError::ModelUnavailable(model),
            PipelineError::Inference(e) => AppError::Inference(e),
            PipelineError::Analysis(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %detail, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %detail, "Request rejected");
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidInput("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge(1024).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::ModelUnavailable("detection").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Inference(InferenceError::Backend("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Timeout(Duration::from_secs(1)).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::PayloadTooLarge(1000).to_string(),
            "Uploaded file exceeds the 1000 byte limit"
        );
        assert_eq!(
            AppError::ModelUnavailable("segmentation").to_string(),
            "The segmentation model is not loaded"
        );
        assert_eq!(
            AppError::Timeout(Duration::from_millis(1500)).to_string(),
            "Inference timed out after 1500ms"
        );
        assert_eq!(
            AppError::Inference(InferenceError::Backend("boom".into())).to_string(),
            "Model backend failed: boom"
        );
    }
}
