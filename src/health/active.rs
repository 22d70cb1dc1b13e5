//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe each backend's root URL
//! - Flip the backend's health flag from the probe outcome
//!
//! # Design Decisions
//! - One monitor task per backend; tasks never terminate
//! - Probes go through the same shared client as request forwarding, so a
//!   backend is only marked healthy when the data plane can actually reach it
//! - A probe is healthy when the transport succeeded within the deadline and
//!   the status is below 500 (4xx counts as alive)
//! - Fixed cadence, no backoff; the per-probe deadline bounds a hung backend

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;

use crate::config::HealthCheckConfig;
use crate::load_balancer::Backend;
use crate::observability::metrics;
use crate::proxy::SharedClient;

/// Spawns and owns the monitor tasks for one load balancer's backends.
pub struct HealthMonitor {
    backends: Vec<Arc<Backend>>,
    client: SharedClient,
    interval: Duration,
    deadline: Duration,
}

impl HealthMonitor {
    pub fn new(
        backends: Vec<Arc<Backend>>,
        config: &HealthCheckConfig,
        client: SharedClient,
    ) -> Self {
        Self {
            backends,
            client,
            interval: Duration::from_secs(config.interval_secs),
            deadline: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Spawn one probe loop per backend. The tasks run until process exit.
    pub fn spawn(self) {
        for backend in self.backends {
            let client = self.client.clone();
            let interval = self.interval;
            let deadline = self.deadline;
            tokio::spawn(async move {
                monitor_backend(backend, client, interval, deadline).await;
            });
        }
    }
}

async fn monitor_backend(
    backend: Arc<Backend>,
    client: SharedClient,
    interval: Duration,
    deadline: Duration,
) {
    loop {
        let healthy = probe(&client, &backend, deadline).await;

        if healthy != backend.is_healthy() {
            if healthy {
                tracing::info!(backend = %backend.url, "Backend recovered");
            } else {
                tracing::warn!(backend = %backend.url, "Backend marked unhealthy");
            }
        }
        backend.set_healthy(healthy);
        metrics::record_backend_health(backend.url.as_str(), healthy);

        tokio::time::sleep(interval).await;
    }
}

/// One GET against the backend root, bounded by the probe deadline. The
/// response body is dropped immediately; only the status matters.
async fn probe(client: &SharedClient, backend: &Backend, deadline: Duration) -> bool {
    let request = match Request::builder()
        .uri(backend.url.as_str())
        .body(Body::empty())
    {
        Ok(request) => request,
        Err(_) => return false,
    };

    match tokio::time::timeout(deadline, client.request(request)).await {
        Ok(Ok(response)) => response.status().as_u16() < 500,
        Ok(Err(e)) => {
            tracing::debug!(
                backend = %backend.url,
                error = %e,
                "Health probe failed"
            );
            false
        }
        Err(_) => {
            tracing::debug!(backend = %backend.url, "Health probe timed out");
            false
        }
    }
}
