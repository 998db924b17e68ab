use thiserror::Error;

/// Failure to bring a model into memory. Fatal to that model's availability.
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model file not found: {0}")]
    NotFound(String),

    #[error("Failed to load model from {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Request-scoped failure while running a model. The handle stays usable.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    #[error("Model backend failed: {0}")]
    Backend(String),

    #[error("Unexpected {model} output shape {shape:?} (expected {expected})")]
    UnexpectedShape {
        model: &'static str,
        shape: Vec<usize>,
        expected: &'static str,
    },

    #[error("Postprocessing failed: {0}")]
    Postprocess(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        let err = ModelLoadError::NotFound("models/missing.onnx".to_string());
        assert_eq!(err.to_string(), "Model file not found: models/missing.onnx");

        let err = ModelLoadError::Malformed {
            path: "bad.onnx".to_string(),
            reason: "protobuf parsing failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load model from bad.onnx: protobuf parsing failed"
        );

        let err = InferenceError::UnexpectedShape {
            model: "detection",
            shape: vec![1, 4],
            expected: "[1, N, 5 + classes]",
        };
        assert_eq!(
            err.to_string(),
            "Unexpected detection output shape [1, 4] (expected [1, N, 5 + classes])"
        );
    }
}
