//! Metrics collection and exposition.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize the Prometheus exporter and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::error!(error = %e, "Failed to install Prometheus recorder");
        return;
    }

    tracing::info!("Metrics server listening on http://{}", addr);
}

/// Record one handled request for a route.
pub fn record_request(route: &str, status: u16) {
    counter!(
        "gateway_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Update backend health for metrics.
pub fn record_backend_health(backend: &str, healthy: bool) {
    let val = if healthy { 1.0 } else { 0.0 };
    gauge!("gateway_backend_healthy", "backend" => backend.to_string()).set(val);
}

/// Record an admission-control rejection (rate, conn or queue).
pub fn record_admission_rejected(kind: &'static str) {
    counter!("gateway_admission_rejected_total", "kind" => kind).increment(1);
}
