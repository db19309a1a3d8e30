//! cors-relay: CORS forwarding proxy
//!
//! Relays every request to one fixed upstream origin and returns the
//! response with permissive CORS headers.

use cors_relay::{RelayConfig, RelayServer};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cors_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = if let Some(config_path) = std::env::args().nth(1) {
        info!("Loading configuration from {}", config_path);
        RelayConfig::from_file(Path::new(&config_path))?
    } else {
        info!("No config file specified, using development defaults");
        RelayConfig::development()
    };

    let server = RelayServer::new(config)?;
    server.run().await?;

    Ok(())
}
