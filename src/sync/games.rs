use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::BookiesClient;
use crate::db::OddsStore;
use crate::models::{Game, Sport};

/// Pulls the full pre-match + live game snapshot and persists it.
pub struct GameSynchronizer {
    client: BookiesClient,
    store: Arc<OddsStore>,
}

impl GameSynchronizer {
    pub fn new(client: BookiesClient, store: Arc<OddsStore>) -> Self {
        Self { client, store }
    }

    /// Fetch every tracked (sport, source) combination sequentially, keeping
    /// whatever succeeded, and hand the aggregate to the store. Returns the
    /// number of games synced; only the persistence step is a hard failure.
    pub async fn sync_games(&self) -> Result<usize> {
        let mut all: Vec<Game> = Vec::new();

        for sport in Sport::TRACKED {
            match self.client.fetch_pre_games(sport).await {
                Ok(games) => all.extend(games),
                Err(e) => warn!("Failed to fetch pre-match {} games: {}", sport.as_str(), e),
            }
        }

        for sport in Sport::TRACKED {
            match self.client.fetch_live_games(sport).await {
                Ok(games) => all.extend(games),
                Err(e) => warn!("Failed to fetch live {} games: {}", sport.as_str(), e),
            }
        }

        let count = all.len();
        self.store.upsert_games(&all).await?;

        info!("Game sync complete: {} games", count);
        Ok(count)
    }
}
