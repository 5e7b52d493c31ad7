//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (requests, latency, resolution outcomes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `static_alias_requests_total` (counter): requests by method, status
//! - `static_alias_request_duration_seconds` (histogram): latency distribution
//! - `static_alias_resolutions_total` (counter): alias, fallthrough, rejected, error
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels for method, status code and resolution kind only

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("static_alias_requests_total", &labels).increment(1);
    metrics::histogram!("static_alias_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome kind of one alias resolution.
pub fn record_resolution(kind: &'static str) {
    metrics::counter!("static_alias_resolutions_total", "kind" => kind).increment(1);
}
