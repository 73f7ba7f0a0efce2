mod routes;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use calfeed_core::CalfeedConfig;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "calfeed-server", about = "Serve calendar events to calendar widgets")]
struct Cli {
    /// Config file (defaults to ~/.config/calfeed/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config =
        CalfeedConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging.level);

    let state = AppState::from_config(&config)?;
    info!(
        listeners = ?state.registry.listener_names(),
        policy = ?state.registry.policy(),
        "Registered listeners"
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::events::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("calfeed-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
