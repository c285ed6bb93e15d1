use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

use crate::models::{Game, GameSummary, LiveOdd, OddsQuote};

/// SQLite store holding the current-state mirror of games and live odds.
pub struct OddsStore {
    pool: Pool<Sqlite>,
}

impl OddsStore {
    /// Open the store and bootstrap the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create data directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .context("Failed to create database directory")?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Odds store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                game_id TEXT PRIMARY KEY,
                sport TEXT NOT NULL,
                bookmaker TEXT NOT NULL,
                source TEXT NOT NULL,
                league TEXT NOT NULL,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                scores TEXT NOT NULL,
                time_status TEXT NOT NULL,
                starts_at INTEGER,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create games table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS liveodds (
                game_id TEXT NOT NULL,
                sport TEXT NOT NULL,
                bookmaker TEXT NOT NULL,
                market_id TEXT NOT NULL,
                market_name TEXT NOT NULL,
                selection_id TEXT NOT NULL,
                selection_name TEXT NOT NULL,
                line TEXT NOT NULL,
                price_dec TEXT NOT NULL,
                price_frac TEXT NOT NULL,
                fetched_at INTEGER NOT NULL,
                raw TEXT NOT NULL,
                PRIMARY KEY (game_id, market_id, selection_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create liveodds table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_games_live
            ON games (source, time_status)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upsert a batch of games, pruning rows whose start time is before the
    /// current UTC date first. An empty batch is a complete no-op.
    pub async fn upsert_games(&self, games: &[Game]) -> Result<()> {
        if games.is_empty() {
            return Ok(());
        }

        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        sqlx::query("DELETE FROM games WHERE starts_at IS NOT NULL AND starts_at < ?")
            .bind(midnight.timestamp())
            .execute(&self.pool)
            .await
            .context("Failed to delete stale games")?;

        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for game in games {
            sqlx::query(
                r#"
                INSERT INTO games (
                    game_id, sport, bookmaker, source, league,
                    home_team, away_team, scores, time_status, starts_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (game_id) DO UPDATE SET
                    sport = excluded.sport,
                    bookmaker = excluded.bookmaker,
                    source = excluded.source,
                    league = excluded.league,
                    home_team = excluded.home_team,
                    away_team = excluded.away_team,
                    scores = excluded.scores,
                    time_status = excluded.time_status,
                    starts_at = excluded.starts_at,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(&game.game_id)
            .bind(game.sport.as_str())
            .bind(&game.bookmaker)
            .bind(game.source.as_str())
            .bind(&game.league)
            .bind(&game.home)
            .bind(&game.away)
            .bind(&game.scores)
            .bind(&game.time_status)
            .bind(game.starts_at.map(|t| t.timestamp()))
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert game")?;
        }

        tx.commit().await.context("Failed to commit game batch")?;
        Ok(())
    }

    /// Upsert a batch of odds, pruning rows fetched more than 24 hours ago
    /// first. An empty batch is a complete no-op.
    pub async fn upsert_live_odds(&self, odds: &[LiveOdd]) -> Result<()> {
        if odds.is_empty() {
            return Ok(());
        }

        let cutoff = Utc::now() - Duration::hours(24);
        sqlx::query("DELETE FROM liveodds WHERE fetched_at < ?")
            .bind(cutoff.timestamp())
            .execute(&self.pool)
            .await
            .context("Failed to delete stale odds")?;

        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for odd in odds {
            sqlx::query(
                r#"
                INSERT INTO liveodds (
                    game_id, sport, bookmaker, market_id, market_name,
                    selection_id, selection_name, line, price_dec, price_frac,
                    fetched_at, raw
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (game_id, market_id, selection_id) DO UPDATE SET
                    sport = excluded.sport,
                    bookmaker = excluded.bookmaker,
                    market_name = excluded.market_name,
                    selection_name = excluded.selection_name,
                    line = excluded.line,
                    price_dec = excluded.price_dec,
                    price_frac = excluded.price_frac,
                    fetched_at = excluded.fetched_at,
                    raw = excluded.raw
                "#,
            )
            .bind(&odd.game_id)
            .bind(&odd.sport)
            .bind(&odd.bookmaker)
            .bind(&odd.market_id)
            .bind(&odd.market_name)
            .bind(&odd.selection_id)
            .bind(&odd.selection_name)
            .bind(&odd.line)
            .bind(&odd.price_dec)
            .bind(&odd.price_frac)
            .bind(odd.fetched_at.timestamp())
            .bind(&odd.raw)
            .execute(&mut *tx)
            .await
            .context("Failed to upsert odds row")?;
        }

        tx.commit().await.context("Failed to commit odds batch")?;
        Ok(())
    }

    /// Ids of games currently live and in play.
    pub async fn live_game_ids(&self) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT game_id FROM games WHERE source = 'live' AND time_status = '1'",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch live game ids")?;

        Ok(ids)
    }

    /// Sport stored for a game, if the game is still present.
    pub async fn game_sport(&self, game_id: &str) -> Result<Option<String>> {
        let sport = sqlx::query_scalar::<_, String>("SELECT sport FROM games WHERE game_id = ?")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch game sport")?;

        Ok(sport)
    }

    /// Read projection: up to 100 upcoming or in-play games ordered by start
    /// time (games without one last), each with its current odds quotes.
    pub async fn games_with_odds(&self) -> Result<Vec<GameSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT game_id, league, home_team, away_team, time_status, starts_at
            FROM games
            WHERE time_status IN ('0', '1')
            ORDER BY starts_at IS NULL, starts_at
            LIMIT 100
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch games")?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let quotes = sqlx::query_as::<_, (String, String)>(
                "SELECT selection_name, price_dec FROM liveodds WHERE game_id = ?",
            )
            .bind(&row.game_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch odds for game")?;

            out.push(GameSummary {
                game_id: row.game_id,
                league: row.league,
                home_team: row.home_team,
                away_team: row.away_team,
                time_status: row.time_status,
                starts_at: row.starts_at.and_then(|secs| DateTime::from_timestamp(secs, 0)),
                odds: quotes
                    .into_iter()
                    .map(|(selection_name, price_dec)| OddsQuote {
                        selection_name,
                        price_dec,
                    })
                    .collect(),
            });
        }

        Ok(out)
    }
}

/// Database row representation
#[derive(sqlx::FromRow)]
struct SummaryRow {
    game_id: String,
    league: String,
    home_team: String,
    away_team: String,
    time_status: String,
    starts_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Source, Sport};

    async fn test_store(name: &str) -> OddsStore {
        let path = std::env::temp_dir().join(format!(
            "odds_mirror_{}_{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        OddsStore::new(&format!("sqlite:{}", path.display()))
            .await
            .unwrap()
    }

    fn game(id: &str, source: Source, time_status: &str, starts_at: Option<DateTime<Utc>>) -> Game {
        Game {
            game_id: id.to_string(),
            sport: Sport::Soccer,
            bookmaker: "bet365".to_string(),
            source,
            league: "Premier League".to_string(),
            home: "Arsenal".to_string(),
            away: "Chelsea".to_string(),
            scores: String::new(),
            time_status: time_status.to_string(),
            starts_at,
        }
    }

    fn odd(game_id: &str, selection_id: &str, price_dec: &str, fetched_at: DateTime<Utc>) -> LiveOdd {
        LiveOdd {
            game_id: game_id.to_string(),
            sport: "soccer".to_string(),
            bookmaker: "bet365".to_string(),
            market_id: "M1".to_string(),
            market_name: "Match Winner".to_string(),
            selection_id: selection_id.to_string(),
            selection_name: format!("Selection {}", selection_id),
            line: String::new(),
            price_dec: price_dec.to_string(),
            price_frac: "5/2".to_string(),
            fetched_at,
            raw: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_games_is_idempotent_and_overwrites() {
        let store = test_store("games_idempotent").await;
        let mut g = game("g1", Source::Pre, "0", Some(Utc::now() + Duration::hours(2)));

        store.upsert_games(std::slice::from_ref(&g)).await.unwrap();
        g.league = "La Liga".to_string();
        store.upsert_games(std::slice::from_ref(&g)).await.unwrap();

        let games = store.games_with_odds().await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].league, "La Liga");
    }

    #[tokio::test]
    async fn games_started_before_today_are_pruned() {
        let store = test_store("games_prune").await;
        let old = game("old", Source::Pre, "0", Some(Utc::now() - Duration::days(2)));
        let fresh = game("fresh", Source::Pre, "0", Some(Utc::now() + Duration::hours(2)));

        store.upsert_games(&[old]).await.unwrap();
        store.upsert_games(&[fresh]).await.unwrap();

        let games = store.games_with_odds().await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, "fresh");
    }

    #[tokio::test]
    async fn games_without_start_time_survive_pruning() {
        let store = test_store("games_null_start").await;
        let live = game("live1", Source::Live, "1", None);
        let fresh = game("fresh", Source::Pre, "0", Some(Utc::now() + Duration::hours(2)));

        store.upsert_games(&[live]).await.unwrap();
        store.upsert_games(&[fresh]).await.unwrap();

        assert_eq!(store.games_with_odds().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_batches_are_complete_no_ops() {
        let store = test_store("empty_noop").await;
        let old_game = game("old", Source::Pre, "0", Some(Utc::now() - Duration::days(2)));
        let old_odd = odd("old", "S1", "3.5", Utc::now() - Duration::hours(30));

        store.upsert_games(std::slice::from_ref(&old_game)).await.unwrap();
        store.upsert_live_odds(std::slice::from_ref(&old_odd)).await.unwrap();

        // Neither call may prune the stale rows above.
        store.upsert_games(&[]).await.unwrap();
        store.upsert_live_odds(&[]).await.unwrap();

        let games = store.games_with_odds().await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].odds.len(), 1);
    }

    #[tokio::test]
    async fn live_game_ids_filters_on_source_and_status() {
        let store = test_store("live_ids").await;
        store
            .upsert_games(&[
                game("in-play", Source::Live, "1", None),
                game("live-not-started", Source::Live, "0", None),
                game("pre-in-play", Source::Pre, "1", None),
            ])
            .await
            .unwrap();

        assert_eq!(store.live_game_ids().await.unwrap(), vec!["in-play".to_string()]);
    }

    #[tokio::test]
    async fn game_sport_lookup() {
        let store = test_store("sport_lookup").await;
        store
            .upsert_games(&[game("g1", Source::Live, "1", None)])
            .await
            .unwrap();

        assert_eq!(store.game_sport("g1").await.unwrap().as_deref(), Some("soccer"));
        assert_eq!(store.game_sport("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn odds_fetched_over_a_day_ago_are_pruned() {
        let store = test_store("odds_prune").await;
        store
            .upsert_games(&[game("g1", Source::Live, "1", None)])
            .await
            .unwrap();

        let stale = odd("g1", "S1", "3.5", Utc::now() - Duration::hours(25));
        let fresh = odd("g1", "S2", "2.5", Utc::now());

        store.upsert_live_odds(&[stale]).await.unwrap();
        store.upsert_live_odds(&[fresh]).await.unwrap();

        let games = store.games_with_odds().await.unwrap();
        assert_eq!(games[0].odds.len(), 1);
        assert_eq!(games[0].odds[0].selection_name, "Selection S2");
    }

    #[tokio::test]
    async fn odds_upsert_overwrites_volatile_fields() {
        let store = test_store("odds_overwrite").await;
        store
            .upsert_games(&[game("g1", Source::Live, "1", None)])
            .await
            .unwrap();

        store
            .upsert_live_odds(&[odd("g1", "S1", "3.5", Utc::now())])
            .await
            .unwrap();
        store
            .upsert_live_odds(&[odd("g1", "S1", "4.333", Utc::now())])
            .await
            .unwrap();

        let games = store.games_with_odds().await.unwrap();
        assert_eq!(games[0].odds.len(), 1);
        assert_eq!(games[0].odds[0].price_dec, "4.333");
    }

    #[tokio::test]
    async fn projection_orders_missing_start_times_last() {
        let store = test_store("projection_order").await;
        let later = Utc::now() + Duration::hours(5);
        let sooner = Utc::now() + Duration::hours(1);
        store
            .upsert_games(&[
                game("no-start", Source::Live, "1", None),
                game("later", Source::Pre, "0", Some(later)),
                game("sooner", Source::Pre, "0", Some(sooner)),
            ])
            .await
            .unwrap();

        let games = store.games_with_odds().await.unwrap();
        let ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["sooner", "later", "no-start"]);
    }
}
