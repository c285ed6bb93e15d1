pub mod bookies;

pub use bookies::{BookiesClient, FetchError, BOOKMAKER};
