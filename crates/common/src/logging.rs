use crate::config::Environment;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

pub(crate) type FilteredRegistry = Layered<EnvFilter, Registry>;
pub(crate) type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync + 'static>;

/// Initialize tracing subscriber with pretty formatting for development
/// and JSON formatting for production.
///
/// Uses RUST_LOG environment variable for filtering (defaults to "info" if not set).
///
/// Use this when no OTLP endpoint is configured; [`crate::TelemetryGuard::init`]
/// installs its own subscriber.
pub fn setup_logging(environment: Environment) {
    install_subscriber(environment, None);
}

/// Install the global subscriber: env-filter, the fmt layer for `environment`
/// and an optional extra layer (the OpenTelemetry bridge).
pub(crate) fn install_subscriber(environment: Environment, extra: Option<BoxedLayer>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers = vec![fmt_layer(environment)];
    layers.extend(extra);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();
}

fn fmt_layer(environment: Environment) -> BoxedLayer {
    match environment {
        Environment::Production => tracing_subscriber::fmt::layer()
            .json()
            .with_level(true)
            .boxed(),
        Environment::Development => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(true)
            .boxed(),
    }
}
