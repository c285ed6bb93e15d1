use chrono::{DateTime, Utc};
use serde::Serialize;

/// Sports mirrored from the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sport {
    Soccer,
    Tennis,
}

impl Sport {
    /// Sports polled on every game sync, in fetch order.
    pub const TRACKED: [Sport; 2] = [Sport::Soccer, Sport::Tennis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Soccer => "soccer",
            Sport::Tennis => "tennis",
        }
    }
}

/// Which upstream feed produced the last write for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pre,
    Live,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Pre => "pre",
            Source::Live => "live",
        }
    }
}

/// One upstream game, pre-match or live.
#[derive(Debug, Clone)]
pub struct Game {
    /// Stable upstream game identifier
    pub game_id: String,

    pub sport: Sport,

    /// Bookmaker the listing was taken from
    pub bookmaker: String,

    pub source: Source,

    pub league: String,
    pub home: String,
    pub away: String,

    /// Free-text score snapshot (empty for pre-match games)
    pub scores: String,

    /// Upstream status code; "0" = not started, "1" = in play
    pub time_status: String,

    /// Kick-off time, absent when upstream gives no parseable epoch
    pub starts_at: Option<DateTime<Utc>>,
}

/// One odds quote attached to a game in the read projection
#[derive(Debug, Serialize)]
pub struct OddsQuote {
    pub selection_name: String,
    pub price_dec: String,
}

/// Row shape returned by `GET /api/games`
#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub time_status: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub odds: Vec<OddsQuote>,
}
