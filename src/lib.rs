pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod odds;
pub mod server;
pub mod sync;
