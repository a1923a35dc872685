//! # Observability Infrastructure
//!
//! Structured logging bootstrap for the vanish secret service using the
//! tracing ecosystem.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;
use crate::errors::{Result, VanishError};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured default filter. Safe to call once
/// per process; a second call reports a configuration error.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| VanishError::config(format!("Invalid log filter: {}", e)))?;

    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed
        .map_err(|e| VanishError::config(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    Ok(())
}
