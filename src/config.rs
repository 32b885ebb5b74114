// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Provider credentials are deliberately optional at startup: a missing
//! credential disables that one adapter's run (logged at collection time)
//! instead of preventing the other sources from being collected.

use chrono::FixedOffset;
use std::env;

/// Fallback day-boundary offset for the activity feed (matches the site's
/// display timezone).
const DEFAULT_DISPLAY_UTC_OFFSET: &str = "-05:00";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// WakaTime API key (bearer token)
    pub wakatime_api_key: String,
    /// Monkeytype ApeKey
    pub monkeytype_api_key: String,
    /// ListenBrainz username (listens are fetched anonymously by username)
    pub listenbrainz_username: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Fixed UTC offset that defines the feed's day boundaries
    pub display_utc_offset: FixedOffset,
}

impl Default for Config {
    /// Default config for testing only. Credentials are left empty so every
    /// adapter takes its local skip path instead of reaching the network.
    fn default() -> Self {
        Self {
            wakatime_api_key: String::new(),
            monkeytype_api_key: String::new(),
            listenbrainz_username: String::new(),
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            display_utc_offset: DEFAULT_DISPLAY_UTC_OFFSET
                .parse()
                .expect("default offset is valid"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            // Provider credentials: absent means that adapter is skipped at
            // collection time, not a boot failure.
            wakatime_api_key: env::var("WAKATIME_API_KEY").unwrap_or_default(),
            monkeytype_api_key: env::var("MONKEYTYPE_API_KEY").unwrap_or_default(),
            listenbrainz_username: env::var("LISTENBRAINZ_USERNAME").unwrap_or_default(),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            display_utc_offset: env::var("DISPLAY_UTC_OFFSET")
                .unwrap_or_else(|_| DEFAULT_DISPLAY_UTC_OFFSET.to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("DISPLAY_UTC_OFFSET"))?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
