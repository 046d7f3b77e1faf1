//! Application configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                      | Default        |
//! |-------------------------------|----------------|
//! | `PARKING_DB_PATH`             | `./parking.db` |
//! | `PARKING_DB_MAX_CONNECTIONS`  | `5`            |
//! | `PARKING_DB_BUSY_TIMEOUT_MS`  | `5000`         |
//! | `PARKING_DB_RUN_MIGRATIONS`   | `true`         |
//!
//! `PARKING_DB_PATH=:memory:` selects a throwaway in-memory database.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use parking_db::DbConfig;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a writer waits for the database lock
    pub db_busy_timeout_ms: u64,

    /// Apply pending migrations at startup
    pub db_run_migrations: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: "./parking.db".to_string(),
            db_max_connections: 5,
            db_busy_timeout_ms: 5000,
            db_run_migrations: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            db_path: lookup("PARKING_DB_PATH")
                .filter(|path| !path.trim().is_empty())
                .unwrap_or(defaults.db_path),

            db_max_connections: match lookup("PARKING_DB_MAX_CONNECTIONS") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PARKING_DB_MAX_CONNECTIONS".to_string()))?,
                None => defaults.db_max_connections,
            },

            db_busy_timeout_ms: match lookup("PARKING_DB_BUSY_TIMEOUT_MS") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PARKING_DB_BUSY_TIMEOUT_MS".to_string()))?,
                None => defaults.db_busy_timeout_ms,
            },

            db_run_migrations: match lookup("PARKING_DB_RUN_MIGRATIONS") {
                Some(raw) => parse_bool(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("PARKING_DB_RUN_MIGRATIONS".to_string()))?,
                None => defaults.db_run_migrations,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PARKING_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        let base = if self.db_path == parking_db::pool::IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.db_path).max_connections(self.db_max_connections)
        };

        base.busy_timeout(Duration::from_millis(self.db_busy_timeout_ms))
            .run_migrations(self.db_run_migrations)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
