pub mod game;
pub mod live_odd;

pub use game::{Game, GameSummary, OddsQuote, Source, Sport};
pub use live_odd::LiveOdd;
