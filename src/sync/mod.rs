pub mod games;
pub mod live_odds;

pub use games::GameSynchronizer;
pub use live_odds::LiveOddsSynchronizer;
