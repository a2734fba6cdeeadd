//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_operations_total` (counter): operations by `operation`, `outcome`
//! - `config_operation_duration_seconds` (histogram): latency by `operation`
//! - `config_documents_stored_total` (counter): successful uploads by `assignment`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one service operation and its latency.
pub fn record_operation(operation: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "config_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("config_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

/// Record a stored document, labelled by how its version was chosen.
pub fn record_stored(explicit_version: bool) {
    let assignment = if explicit_version { "explicit" } else { "auto" };
    metrics::counter!("config_documents_stored_total", "assignment" => assignment).increment(1);
}
