use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::api::BookiesClient;
use crate::db::OddsStore;

/// Refreshes odds for games currently in play.
pub struct LiveOddsSynchronizer {
    client: BookiesClient,
    store: Arc<OddsStore>,
}

impl LiveOddsSynchronizer {
    pub fn new(client: BookiesClient, store: Arc<OddsStore>) -> Self {
        Self { client, store }
    }

    /// Fetch and persist odds per live game, one game at a time. A failure
    /// on one game is logged and skipped; reading the live id list is the
    /// only hard failure. Returns the total rows written.
    pub async fn sync_live_odds(&self) -> Result<usize> {
        let game_ids = self.store.live_game_ids().await?;
        let mut inserted = 0;

        for game_id in game_ids {
            let sport = match self.store.game_sport(&game_id).await {
                Ok(Some(sport)) => sport,
                Ok(None) => {
                    warn!("Game {} disappeared before its odds fetch", game_id);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to look up sport for {}: {}", game_id, e);
                    continue;
                }
            };

            let odds = match self.client.fetch_live_odds(&game_id, &sport).await {
                Ok(odds) => odds,
                Err(e) => {
                    warn!("Failed to fetch odds for {}: {}", game_id, e);
                    continue;
                }
            };

            if let Err(e) = self.store.upsert_live_odds(&odds).await {
                warn!("Failed to store odds for {}: {}", game_id, e);
                continue;
            }

            inserted += odds.len();
        }

        info!("Live odds sync complete: {} rows", inserted);
        Ok(inserted)
    }
}
