//! # Configuration Management
//!
//! Application configuration for the vanish secret service, loaded from
//! `VANISH_`-prefixed environment variables. A `.env` file is read first
//! when `APP_ENV=local`, mirroring how the service is run during
//! development.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::errors::{Result, VanishError};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Logging configuration
    pub log: LogConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be at most 50"))]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub connect_timeout_seconds: u64,

    /// Run embedded migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 5,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection acquire timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter directive (overridden by RUST_LOG)
    pub level: String,

    /// Emit JSON-formatted log lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Local development loads variables from .env, as the deployed
        // environment injects them directly.
        if std::env::var("APP_ENV").as_deref() == Ok("local") {
            dotenvy::dotenv().ok();
        }

        let database = DatabaseConfig {
            url: std::env::var("VANISH_DATABASE_URL").unwrap_or_default(),
            max_connections: env_parse("VANISH_DB_MAX_CONNECTIONS", 10)?,
            min_connections: env_parse("VANISH_DB_MIN_CONNECTIONS", 1)?,
            connect_timeout_seconds: env_parse("VANISH_DB_CONNECT_TIMEOUT_SECONDS", 5)?,
            auto_migrate: env_parse("VANISH_DB_AUTO_MIGRATE", true)?,
        };

        let log = LogConfig {
            level: std::env::var("VANISH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            json: env_parse("VANISH_LOG_JSON", false)?,
        };

        let config = Self { database, log };
        config.validate_all()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        Validate::validate(self).map_err(VanishError::from)?;

        if self.database.min_connections > self.database.max_connections {
            return Err(VanishError::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }

        if !self.database.url.starts_with("postgresql://")
            && !self.database.url.starts_with("postgres://")
        {
            return Err(VanishError::validation(
                "Database URL must start with 'postgresql://' or 'postgres://'",
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| VanishError::config(format!("Invalid value for {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
