use common::{TelemetryGuard, setup_logging};
use gateway::{AppState, GatewayConfig, TrafficAnalyzer, create_router};
use inference::backend::ort::OrtBackend;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;

    // TelemetryGuard installs its own subscriber; only fall back to plain
    // logging when no collector is configured.
    let _telemetry = match config.otel_endpoint.as_deref() {
        Some(endpoint) => Some(TelemetryGuard::init(
            "gateway",
            endpoint,
            config.environment,
        )?),
        None => {
            setup_logging(config.environment);
            None
        }
    };

    tracing::info!(
        environment = config.environment.as_str(),
        bind_addr = %config.bind_addr,
        detection_model = %config.inference.detection_model_path,
        segmentation_model = %config.inference.segmentation_model_path,
        use_gpu = config.inference.load_options.use_gpu,
        "Gateway starting"
    );

    let inference_config = config.inference.clone();
    let analyzer = tokio::task::spawn_blocking(move || {
        TrafficAnalyzer::<OrtBackend>::load(&inference_config)
    })
    .await?;

    if !analyzer.detection_loaded() || !analyzer.segmentation_loaded() {
        tracing::warn!(
            detection_model_loaded = analyzer.detection_loaded(),
            segmentation_model_loaded = analyzer.segmentation_loaded(),
            "Starting with missing models; dependent endpoints will answer 503"
        );
    }

    let state = Arc::new(AppState::new(analyzer, &config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
