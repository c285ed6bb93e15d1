use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{Game, LiveOdd, Source, Sport};
use crate::odds::frac_to_decimal;

/// Bookmaker identifier stamped on every mirrored row.
pub const BOOKMAKER: &str = "bet365";

/// Errors reaching or decoding the upstream odds API. Data-level anomalies
/// (missing fields, bad odds text) never surface here; they degrade to
/// absent data instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the bookies odds API (query-parameter authenticated GET).
#[derive(Clone)]
pub struct BookiesClient {
    client: Client,
    base_url: String,
    login: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct PreGamesResponse {
    #[serde(default)]
    games_pre: Vec<PreGame>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PreGame {
    game_id: String,
    time: String,
    time_status: String,
    league: String,
    home: String,
    away: String,
    scores: String,
}

#[derive(Debug, Deserialize)]
struct LiveOddsResponse {
    #[serde(default)]
    results: Vec<Vec<Map<String, Value>>>,
}

impl BookiesClient {
    /// Create a new client with bounded request timeouts.
    pub fn new(base_url: &str, login: &str, token: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            login: login.to_string(),
            token: token.to_string(),
        })
    }

    /// Fetch the pre-match game list for one sport.
    pub async fn fetch_pre_games(&self, sport: Sport) -> Result<Vec<Game>, FetchError> {
        let body = self
            .get(&[
                ("task", "pre"),
                ("bookmaker", BOOKMAKER),
                ("sport", sport.as_str()),
            ])
            .await?;
        let response: PreGamesResponse = serde_json::from_str(&body)?;

        Ok(response
            .games_pre
            .into_iter()
            .map(|g| Game {
                game_id: g.game_id,
                sport,
                bookmaker: BOOKMAKER.to_string(),
                source: Source::Pre,
                league: g.league,
                home: g.home,
                away: g.away,
                scores: g.scores,
                time_status: g.time_status,
                starts_at: parse_unix_maybe(&g.time),
            })
            .collect())
    }

    /// Fetch the live game list for one sport. The live feed has no fixed
    /// schema, so the payload is decoded dynamically and every field is
    /// coerced to a string.
    pub async fn fetch_live_games(&self, sport: Sport) -> Result<Vec<Game>, FetchError> {
        let body = self
            .get(&[
                ("task", "live"),
                ("bookmaker", BOOKMAKER),
                ("sport", sport.as_str()),
            ])
            .await?;
        let root: Value = serde_json::from_str(&body)?;

        Ok(live_games_from(sport, &root))
    }

    /// Fetch the current odds for one live game.
    pub async fn fetch_live_odds(
        &self,
        game_id: &str,
        sport: &str,
    ) -> Result<Vec<LiveOdd>, FetchError> {
        let body = self
            .get(&[
                ("task", "liveodds"),
                ("bookmaker", BOOKMAKER),
                ("game_id", game_id),
            ])
            .await?;
        let response: LiveOddsResponse = serde_json::from_str(&body)?;

        Ok(collect_live_odds(game_id, sport, &response.results, Utc::now()))
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String, FetchError> {
        debug!("Upstream request: {:?}", params);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("login", self.login.as_str()),
                ("token", self.token.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        Ok(body)
    }
}

fn live_games_from(sport: Sport, root: &Value) -> Vec<Game> {
    // A payload without a games array means nothing is live, not an error.
    let Some(items) = root.get("games").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|record| Game {
            game_id: field_str(record, "game_id"),
            sport,
            bookmaker: BOOKMAKER.to_string(),
            source: Source::Live,
            league: field_str(record, "league"),
            home: field_str(record, "home"),
            away: field_str(record, "away"),
            scores: field_str(record, "scores"),
            time_status: field_str(record, "time_status"),
            starts_at: parse_unix_maybe(&field_str(record, "time")),
        })
        .collect()
}

/// Fold one game's ordered result stream into odds rows.
///
/// Market metadata arrives once as an `MG` record and applies to every
/// following `PA` record until the next `MG`, so groups and records must be
/// walked strictly in upstream order.
fn collect_live_odds(
    game_id: &str,
    sport: &str,
    groups: &[Vec<Map<String, Value>>],
    fetched_at: DateTime<Utc>,
) -> Vec<LiveOdd> {
    let mut out = Vec::new();
    let mut market_id = String::new();
    let mut market_name = String::new();

    for group in groups {
        for record in group {
            match field_str(record, "type").as_str() {
                "MG" => {
                    market_id = field_str(record, "ID");
                    market_name = field_str(record, "NA");
                }
                "PA" => {
                    let Some(price_frac) = odds_field(record) else {
                        continue;
                    };
                    let price_dec = frac_to_decimal(&price_frac).unwrap_or_default();

                    out.push(LiveOdd {
                        game_id: game_id.to_string(),
                        sport: sport.to_string(),
                        bookmaker: BOOKMAKER.to_string(),
                        market_id: market_id.clone(),
                        market_name: market_name.clone(),
                        selection_id: field_str(record, "ID"),
                        selection_name: field_str(record, "NA"),
                        line: field_str(record, "HA"),
                        price_dec,
                        price_frac,
                        fetched_at,
                        raw: Value::Object(record.clone()).to_string(),
                    });
                }
                _ => {}
            }
        }
    }

    out
}

/// Upstream is inconsistent about the odds key; take the first one present.
fn odds_field(record: &Map<String, Value>) -> Option<String> {
    ["OD", "ODD", "ODDS"]
        .iter()
        .find_map(|key| record.get(*key).map(stringify))
}

/// Upstream field types are not trusted; render whatever is there as text.
fn field_str(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(value) => stringify(value),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Upstream start times are epoch seconds as strings; blank, unparseable or
/// non-positive values mean "no start time", not an error.
fn parse_unix_maybe(text: &str) -> Option<DateTime<Utc>> {
    let secs: i64 = text.trim().parse().ok()?;
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
