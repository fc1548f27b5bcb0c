//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by resource, operation, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_backend_calls_total` (counter): backend calls by group and result code
//! - `gateway_backend_call_duration_seconds` (histogram): backend latency by group
//! - `gateway_backend_connected` (gauge): 1=connected, 0=unreachable, by group
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resources::Operation;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished inbound request.
pub fn record_request(resource: &'static str, operation: Operation, status: u16, started: Instant) {
    let operation = operation.to_string();
    counter!(
        "gateway_requests_total",
        "resource" => resource,
        "operation" => operation.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "resource" => resource,
        "operation" => operation
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record one backend call.
pub fn record_backend_call(group: &'static str, code: &'static str, started: Instant) {
    counter!("gateway_backend_calls_total", "group" => group, "code" => code).increment(1);
    histogram!("gateway_backend_call_duration_seconds", "group" => group)
        .record(started.elapsed().as_secs_f64());
}

/// Record whether a backend group has a live connection.
pub fn record_backend_connected(group: &str, connected: bool) {
    gauge!("gateway_backend_connected", "group" => group.to_string())
        .set(if connected { 1.0 } else { 0.0 });
}
