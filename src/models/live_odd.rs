use chrono::{DateTime, Utc};

/// One priced selection for a live game, unique per
/// (game_id, market_id, selection_id).
#[derive(Debug, Clone)]
pub struct LiveOdd {
    pub game_id: String,

    /// Sport as stored on the game row; passed through untyped so unknown
    /// sports survive a round trip
    pub sport: String,

    pub bookmaker: String,

    /// Market the selection belongs to, carried over from the most recent
    /// market-group record in the upstream stream
    pub market_id: String,
    pub market_name: String,

    pub selection_id: String,
    pub selection_name: String,

    /// Handicap / spread text, empty when the market has none
    pub line: String,

    /// Decimal odds derived from the fractional text, empty when the
    /// conversion failed
    pub price_dec: String,

    /// Original fractional odds text, preserved verbatim
    pub price_frac: String,

    pub fetched_at: DateTime<Utc>,

    /// Full upstream record serialized as JSON, kept for audit
    pub raw: String,
}
