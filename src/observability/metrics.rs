//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fulfillment_requests_total` (counter): webhook requests by status
//! - `fulfillment_request_duration_seconds` (histogram): latency distribution
//! - `fulfillment_intents_total` (counter): dispatched intents by action
//! - `fulfillment_connector_calls_total` (counter): outbound calls by connector, outcome
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished webhook request.
pub fn record_request(status: u16, start: Instant) {
    let status = status.to_string();
    counter!("fulfillment_requests_total", "status" => status).increment(1);
    histogram!("fulfillment_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an intent dispatch. Unregistered actions are recorded as `default`.
pub fn record_intent(action: &str, registered: bool) {
    let action = if registered { action.to_string() } else { "default".to_string() };
    counter!("fulfillment_intents_total", "action" => action).increment(1);
}

/// Record an outbound connector call.
pub fn record_connector_call(connector: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("fulfillment_connector_calls_total", "connector" => connector, "outcome" => outcome)
        .increment(1);
}
