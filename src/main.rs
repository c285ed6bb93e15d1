use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use odds_mirror::api::BookiesClient;
use odds_mirror::config::Config;
use odds_mirror::db::OddsStore;
use odds_mirror::server::{self, AppState};
use odds_mirror::sync::{GameSynchronizer, LiveOddsSynchronizer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "odds_mirror=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting odds-mirror");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Initialize database
    let store = Arc::new(OddsStore::new(&config.database_url).await?);
    info!("Database initialized");

    // Upstream client, shared by both synchronizers
    let client = BookiesClient::new(&config.api_base_url, &config.api_login, &config.api_token)?;

    let state = AppState {
        games: Arc::new(GameSynchronizer::new(client.clone(), Arc::clone(&store))),
        live_odds: Arc::new(LiveOddsSynchronizer::new(client, Arc::clone(&store))),
        store,
    };

    let app = server::router(state, &config.allowed_origin)?;
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down odds-mirror");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
