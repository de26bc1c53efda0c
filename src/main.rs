mod config;
mod error;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::time::Instant;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::models::ParseOptions;
use crate::services::upstream::UpstreamClient;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub upstream: UpstreamClient,
    pub start_time: Instant,
}

impl AppState {
    /// Parser settings derived from configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            container_extension: self.config.container_extension,
            retain_player_options: self.config.retain_player_options,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xtream_relay=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let port = config.port;

    tracing::info!("Starting Xtream Relay v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        container_extension = ?config.container_extension,
        aux_proxy = config.auxiliary_proxy_host.is_some(),
        "Configuration loaded"
    );

    let upstream = UpstreamClient::new(&config)?;

    // Build application state
    let state = Arc::new(AppState {
        config,
        upstream,
        start_time: Instant::now(),
    });

    let app = routes::build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
