//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use library_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            host: lookup("LIBRARY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: parse_var(&lookup, "LIBRARY_PORT", "8000")?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./library.db".to_string()),

            db_max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS", "5")?,

            run_migrations: parse_var(&lookup, "RUN_MIGRATIONS", "true")?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LIBRARY_HOST".to_string()))
    }

    /// Pool settings for [`library_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        if self.database_path == ":memory:" {
            return DbConfig::in_memory().run_migrations(self.run_migrations);
        }

        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .run_migrations(self.run_migrations)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError> {
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
