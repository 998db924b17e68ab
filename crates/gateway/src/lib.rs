pub mod config;
pub mod encoding;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::GatewayConfig;
pub use errors::AppError;
pub use pipeline::TrafficAnalyzer;
pub use routes::create_router;
pub use state::AppState;
