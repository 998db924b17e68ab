use common::env_or;
use inference::InferenceConfig;
use std::env;
use std::time::Duration;

pub use common::Environment;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub inference_timeout: Duration,
    pub otel_endpoint: Option<String>,
    pub inference: InferenceConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let bind_addr = env_or("GATEWAY_BIND_ADDR", DEFAULT_BIND_ADDR.to_string());
        let max_upload_bytes = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES);
        let inference_timeout_ms = env_or("INFERENCE_TIMEOUT_MS", DEFAULT_INFERENCE_TIMEOUT_MS);

        if inference_timeout_ms == 0 {
            anyhow::bail!("INFERENCE_TIMEOUT_MS must be greater than zero");
        }

        let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            environment,
            bind_addr,
            max_upload_bytes,
            inference_timeout: Duration::from_millis(inference_timeout_ms),
            otel_endpoint,
            inference: InferenceConfig::from_env()?,
        })
    }

    /// Create default configuration for testing
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            inference_timeout: Duration::from_millis(DEFAULT_INFERENCE_TIMEOUT_MS),
            otel_endpoint: None,
            inference: InferenceConfig::test_default(),
        }
    }
}
