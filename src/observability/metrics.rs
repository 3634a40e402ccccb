//! Metrics collection and exposition.
//!
//! # Metrics
//! - `agent_requests_total` (counter): requests by route and status
//! - `agent_admission_total` (counter): sliding-window decisions by outcome and tier
//! - `agent_edge_admission_total` (counter): edge limiter decisions by outcome and window
//! - `agent_identity_lookups_total` (counter): card cache results (hit, miss, error, skipped)
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(route: &str, status: u16) {
    counter!(
        "agent_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_admission(outcome: &'static str, tier: &'static str) {
    counter!("agent_admission_total", "outcome" => outcome, "tier" => tier).increment(1);
}

pub fn record_edge_admission(outcome: &'static str, window: &'static str) {
    counter!("agent_edge_admission_total", "outcome" => outcome, "window" => window).increment(1);
}

pub fn record_identity_lookup(result: &'static str) {
    counter!("agent_identity_lookups_total", "result" => result).increment(1);
}
