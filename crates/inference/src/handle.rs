use crate::backend::{InferenceBackend, InferenceOutput, LoadOptions};
use crate::errors::{InferenceError, ModelLoadError};
use ndarray::{Array, IxDyn};
use opentelemetry::{KeyValue, global, metrics::Histogram};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// A loaded model shared read-only by every request for the process lifetime.
///
/// Calls are serialised on an internal lock; the backend keeps no
/// per-request state between calls.
pub struct ModelHandle<B: InferenceBackend> {
    name: &'static str,
    backend: Mutex<B>,
    run_duration: Histogram<f64>,
}

impl<B: InferenceBackend> ModelHandle<B> {
    pub fn load(
        name: &'static str,
        path: &str,
        options: &LoadOptions,
    ) -> Result<Self, ModelLoadError> {
        if !Path::new(path).exists() {
            return Err(ModelLoadError::NotFound(path.to_string()));
        }

        tracing::info!(model = name, path, use_gpu = options.use_gpu, "Loading model");

        let backend = B::load_model(path, options).map_err(|e| ModelLoadError::Malformed {
            path: path.to_string(),
            reason: format!("{:#}", e),
        })?;

        Ok(Self::new(name, backend))
    }

    pub fn new(name: &'static str, backend: B) -> Self {
        let latency_buckets = [
            0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0,
        ];
        let run_duration = global::meter("inference")
            .f64_histogram("model_run_duration_seconds")
            .with_description("Time spent inside the model backend per call")
            .with_unit("s")
            .with_boundaries(latency_buckets.to_vec())
            .build();

        Self {
            name,
            backend: Mutex::new(backend),
            run_duration,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn run(&self, input: &Array<f32, IxDyn>) -> Result<InferenceOutput, InferenceError> {
        // A panic in an earlier call leaves no partial state in the backend worth
        // discarding, so keep serving.
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);

        let start = Instant::now();
        let result = backend.infer(input);
        self.run_duration.record(
            start.elapsed().as_secs_f64(),
            &[
                KeyValue::new("model", self.name),
                KeyValue::new("ok", result.is_ok()),
            ],
        );

        result.map_err(|e| InferenceError::Backend(format!("{:#}", e)))
    }
}
