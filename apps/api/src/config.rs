//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port.
    pub http_port: u16,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// Maximum connections in the database pool.
    pub db_max_connections: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "shopkeep.db".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,
        };

        Ok(config)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 3000,
            database_path: "shopkeep.db".to_string(),
            db_max_connections: 5,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
