use crate::config::GatewayConfig;
use crate::errors::AppError;
use crate::metrics::RequestMetrics;
use crate::pipeline::{PipelineError, TrafficAnalyzer};
use inference::InferenceBackend;
use std::sync::Arc;
use std::time::Duration;

/// Shared by every handler. Built once at startup.
pub struct AppState<B: InferenceBackend> {
    pub analyzer: Arc<TrafficAnalyzer<B>>,
    pub metrics: Arc<RequestMetrics>,
    pub inference_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl<B: InferenceBackend> AppState<B> {
    pub fn new(analyzer: TrafficAnalyzer<B>, config: &GatewayConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            metrics: Arc::new(RequestMetrics::new()),
            inference_timeout: config.inference_timeout,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Run `job` against the analyzer on the blocking pool, bounded by the
    /// inference timeout.
    ///
    /// On timeout the caller gets an error straight away; the blocking task
    /// runs to completion in the background and its result is dropped.
    pub async fn run_blocking<T, F>(&self, job: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&TrafficAnalyzer<B>) -> Result<T, PipelineError> + Send + 'static,
    {
        let analyzer = self.analyzer.clone();
        let task = tokio::task::spawn_blocking(move || job(&analyzer));

        match tokio::time::timeout(self.inference_timeout, task).await {
            Ok(Ok(result)) => result.map_err(AppError::from),
            Ok(Err(join_error)) => Err(AppError::Internal(format!(
                "Inference task failed: {}",
                join_error
            ))),
            Err(_) => Err(AppError::Timeout(self.inference_timeout)),
        }
    }
}
