use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide request counters, zero at start.
///
/// Owned by the application state and shared with the tracking middleware.
/// Every event is mirrored to OpenTelemetry, which keeps its own cumulative
/// totals and is unaffected by [`RequestMetrics::reset`].
pub struct RequestMetrics {
    requests_total: AtomicU64,
    errors_total: AtomicU64,
    started_at: Instant,
    otel: OtelInstruments,
}

struct OtelInstruments {
    requests: Counter<u64>,
    errors: Counter<u64>,
    duration: Histogram<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub errors_total: u64,
    pub uptime_seconds: f64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        let meter = global::meter("gateway");
        let otel = OtelInstruments {
            requests: meter
                .u64_counter("http_requests_total")
                .with_description("Total HTTP requests received")
                .build(),
            errors: meter
                .u64_counter("http_errors_total")
                .with_description("Total HTTP responses with a 4xx or 5xx status")
                .build(),
            duration: meter
                .f64_histogram("http_request_duration_seconds")
                .with_description("End-to-end request handling time")
                .with_unit("s")
                .build(),
        };

        Self {
            requests_total: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            started_at: Instant::now(),
            otel,
        }
    }

    pub fn record_request(&self, route: &str) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.otel
            .requests
            .add(1, &[KeyValue::new("route", route.to_string())]);
    }

    pub fn record_error(&self, route: &str, status: u16) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
        self.otel.errors.add(
            1,
            &[
                KeyValue::new("route", route.to_string()),
                KeyValue::new("status", status as i64),
            ],
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs_f64(),
        }
    }

    /// Zero both counters and return what they held. Uptime is not reset.
    pub fn reset(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.swap(0, Ordering::Relaxed),
            errors_total: self.errors_total.swap(0, Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Route template the request matched, so unknown paths share one label.
pub fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned())
}

/// Counts the request on arrival and its outcome once the response is built.
pub async fn track_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let route = route_label(&request);
    let start = Instant::now();

    metrics.record_request(&route);

    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.record_error(&route, status.as_u16());
    }

    metrics.otel.duration.record(
        start.elapsed().as_secs_f64(),
        &[
            KeyValue::new("route", route),
            KeyValue::new("status", status.as_u16() as i64),
        ],
    );

    response
}
