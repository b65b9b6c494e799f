//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route, status
//! - `gateway_request_duration_seconds` (histogram): latency by route
//! - `gateway_registry_lookups_total` (counter): lookups by service, outcome
//! - `gateway_upstream_errors_total` (counter): failed forwards by service, kind
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a registry lookup outcome (`ok`, `empty`, or an error kind).
pub fn record_registry_lookup(service: &str, outcome: &'static str) {
    counter!(
        "gateway_registry_lookups_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a failed forward.
pub fn record_upstream_error(service: &str, kind: &'static str) {
    counter!(
        "gateway_upstream_errors_total",
        "service" => service.to_string(),
        "kind" => kind
    )
    .increment(1);
}
