use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bookies API endpoint
    pub api_base_url: String,

    /// Bookies API account login
    pub api_login: String,

    /// Bookies API account token
    pub api_token: String,

    /// SQLite database path
    pub database_url: String,

    /// HTTP listen port
    pub port: u16,

    /// Origin allowed to call the HTTP surface
    pub allowed_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "https://bookiesapi.com/api/get.php".to_string()),

            api_login: env::var("API_LOGIN").context("API_LOGIN must be set")?,

            api_token: env::var("API_TOKEN").context("API_TOKEN must be set")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/odds.db".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "9090".to_string())
                .parse()
                .context("PORT must be a valid port number")?,

            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://127.0.0.1:5173".to_string()),
        })
    }
}
