//! HTTP server setup.
//!
//! # Responsibilities
//! - Assemble the router from the service table
//! - Bind the bounded listener
//! - Serve until shutdown is requested

use crate::config::GatewayConfig;
use crate::net::{BoundedListener, ClientAddr};
use crate::routing::{build_router, AssembleError};

/// The assembled gateway, ready to serve.
pub struct GatewayServer {
    router: axum::Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Build the dispatch table. Must run inside the runtime; health
    /// monitors are spawned here.
    pub fn new(config: GatewayConfig, secret: Option<Vec<u8>>) -> Result<Self, AssembleError> {
        let router = build_router(&config, secret.as_deref())?;
        Ok(Self { router, config })
    }

    /// Bind and serve until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = BoundedListener::bind(&self.config.listener).await?;

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<ClientAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
