//! Metrics collection and exposition.
//!
//! # Metrics
//! - `contest_view_calls_total` (counter): view calls by function, outcome
//! - `contest_transactions_total` (counter): submitted transactions by function, outcome
//! - `contest_node_request_duration_seconds` (histogram): node round-trip latency
//! - `contest_node_health` (gauge): 1=reachable, 0=unreachable
//! - `contest_api_requests_total` (counter): API requests by endpoint

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_view_call(function: &str, ok: bool) {
    counter!(
        "contest_view_calls_total",
        "function" => function.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_transaction(function: &str, ok: bool) {
    counter!(
        "contest_transactions_total",
        "function" => function.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_node_request(endpoint: &'static str, start: Instant) {
    histogram!("contest_node_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_node_health(healthy: bool) {
    gauge!("contest_node_health").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_api_request(endpoint: &'static str) {
    counter!("contest_api_requests_total", "endpoint" => endpoint).increment(1);
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}
