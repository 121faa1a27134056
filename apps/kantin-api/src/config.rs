//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use kantin_db::DbConfig;

/// Kantin API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Upper bound on pooled SQLite connections
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8000,
            database_path: PathBuf::from("./kantin.db"),
            db_max_connections: 5,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: parse_var("KANTIN_HTTP_PORT", defaults.http_port)?,

            database_path: env::var("KANTIN_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            db_max_connections: parse_var("KANTIN_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "KANTIN_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
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
        let config = ApiConfig::default();
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.database_path, PathBuf::from("./kantin.db"));
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let port: u16 = parse_var("KANTIN_TEST_UNSET_VARIABLE", 8123).unwrap();
        assert_eq!(port, 8123);
    }
}
