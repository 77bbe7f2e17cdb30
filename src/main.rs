use anyhow::Context;
use tracing_subscriber::EnvFilter;

use budget_api_rust::config::config;
use budget_api_rust::database::DatabaseManager;
use budget_api_rust::{app, is_development, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    config.validate().map_err(anyhow::Error::msg).context("invalid configuration")?;
    tracing::info!("Starting Budget API in {:?} mode", config.environment);
    if is_development!() {
        tracing::warn!("Development mode: built-in JWT secret and in-memory store unless overridden");
    }

    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open the store")?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("failed to create upload directory {}", config.uploads.dir.display()))?;

    let state = AppState::new(store, config.clone()).context("failed to build JWT keys")?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Budget API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
