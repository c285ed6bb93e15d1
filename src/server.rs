use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::db::OddsStore;
use crate::sync::{GameSynchronizer, LiveOddsSynchronizer};

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub games: Arc<GameSynchronizer>,
    pub live_odds: Arc<LiveOddsSynchronizer>,
    pub store: Arc<OddsStore>,
}

/// Build the application router with CORS restricted to one origin.
pub fn router(state: AppState, allowed_origin: &str) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(
            allowed_origin
                .parse::<HeaderValue>()
                .context("ALLOWED_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/sync-games", get(sync_games))
        .route("/update-liveodds", get(update_live_odds))
        .route("/api/games", get(list_games))
        .layer(cors)
        .with_state(state))
}

async fn sync_games(State(state): State<AppState>) -> impl IntoResponse {
    match state.games.sync_games().await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({"status": "games synced", "count": count})),
        ),
        Err(e) => {
            error!("Game sync failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

async fn update_live_odds(State(state): State<AppState>) -> impl IntoResponse {
    match state.live_odds.sync_live_odds().await {
        Ok(inserted) => (
            StatusCode::OK,
            Json(json!({"status": "odds updated", "inserted": inserted})),
        ),
        Err(e) => {
            error!("Live odds sync failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

async fn list_games(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.games_with_odds().await {
        Ok(games) => (StatusCode::OK, Json(json!({"games": games}))),
        Err(e) => {
            error!("Game listing failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}
