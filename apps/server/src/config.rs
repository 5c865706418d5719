//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;

use chrono::FixedOffset;

use kasir_core::time::store_offset_from_minutes;
use kasir_core::{DEFAULT_INVOICE_PREFIX, DEFAULT_STORE_OFFSET_MINUTES};
use kasir_engine::StoreSettings;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file path
    pub database_path: String,

    /// HTTP bind address
    pub listen_addr: SocketAddr,

    /// Invoice number prefix
    pub invoice_prefix: String,

    /// Store-local UTC offset
    pub store_offset: FixedOffset,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let listen_addr = env::var("KASIR_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("KASIR_LISTEN_ADDR".to_string()))?;

        let offset_minutes: i32 = env::var("KASIR_STORE_OFFSET_MINUTES")
            .unwrap_or_else(|_| DEFAULT_STORE_OFFSET_MINUTES.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("KASIR_STORE_OFFSET_MINUTES".to_string()))?;
        let store_offset = store_offset_from_minutes(offset_minutes)
            .ok_or_else(|| ConfigError::InvalidValue("KASIR_STORE_OFFSET_MINUTES".to_string()))?;

        Ok(ServerConfig {
            database_path: env::var("KASIR_DATABASE_PATH")
                .unwrap_or_else(|_| "./kasir.db".to_string()),

            listen_addr,

            invoice_prefix: env::var("KASIR_INVOICE_PREFIX")
                .unwrap_or_else(|_| DEFAULT_INVOICE_PREFIX.to_string()),

            store_offset,
        })
    }

    /// The engine settings derived from this configuration.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings::new(self.invoice_prefix.clone(), self.store_offset)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // None of the KASIR_* variables are set in the test environment.
        let config = ServerConfig::load().unwrap();

        assert_eq!(config.database_path, "./kasir.db");
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.invoice_prefix, "INV");
        assert_eq!(config.store_offset.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_store_settings_carries_the_offset() {
        let config = ServerConfig::load().unwrap();
        let settings = config.store_settings();

        assert_eq!(settings.invoice_prefix, config.invoice_prefix);
        assert_eq!(settings.store_offset, config.store_offset);
    }
}
