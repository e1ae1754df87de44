use anyhow::Context;
use mangarelay_server::{AppState, ServerConfig, app};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "mangarelay_server=info,mangarelay_core=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    let config = ServerConfig::from_env().context("Failed to read configuration")?;
    let state = AppState::new(config.fetch, config.origin).context("Failed to build origin client")?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    info!(addr = %config.addr, "listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
