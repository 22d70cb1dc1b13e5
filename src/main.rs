//! Gateway binary: load the service table, assemble the router, serve.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway::config;
use gateway::observability::metrics;
use gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Configuration-driven HTTP API gateway", long_about = None)]
struct Args {
    /// Path to the YAML service table.
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = config::load_config(&args.config)?;

    tracing::info!(
        services = config.services.len(),
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let secret = std::env::var("GATEWAY_JWT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
        .map(String::into_bytes);

    let server = GatewayServer::new(config, secret)?;
    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
