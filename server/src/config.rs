//! Configuration management for the server.
//!
//! Loads configuration from environment variables (after `.env`) with
//! sensible defaults. Unparseable numbers fall back to their default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite configuration
    pub database: DatabaseConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// SQLite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://db.sqlite3`
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Path the todo routes are nested under
    pub api_prefix: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// `host:port` to bind
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long in-flight requests get to finish after a shutdown signal
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl Config {
    /// Load `.env` (if present), then read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());

        Self {
            database: DatabaseConfig {
                url: lookup("CHECKMARK_DATABASE_URL")
                    .unwrap_or_else(|| "sqlite://db.sqlite3".to_string()),
                max_connections: parsed("CHECKMARK_DATABASE_MAX_CONNECTIONS").unwrap_or(5),
            },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("PORT")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(3000),
                api_prefix: lookup("CHECKMARK_API_PREFIX").unwrap_or_else(|| "/api".to_string()),
                shutdown_timeout: lookup("SHUTDOWN_TIMEOUT")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(30),
            },
        }
    }
}
