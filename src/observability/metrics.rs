//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): served requests by method, status
//! - `http_request_duration_seconds` (histogram): read-to-write latency
//! - `http_parse_errors_total` (counter): connections dropped while reading
//! - `http_connections_active` (gauge): connections currently being served
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_parse_error() {
    ::metrics::counter!("http_parse_errors_total").increment(1);
}

pub fn set_active_connections(count: u64) {
    ::metrics::gauge!("http_connections_active").set(count as f64);
}
