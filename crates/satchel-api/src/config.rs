//! Environment-driven server configuration.
//!
//! All settings have working defaults; each can be overridden through a
//! `SATCHEL_*` environment variable read once at startup.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors raised while reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// TCP port the server listens on.
    pub port: u16,

    /// Path of the SQLite database file.
    pub db_path: PathBuf,

    /// Directory uploaded document bytes are written to.
    pub upload_dir: PathBuf,

    /// Override for the seeded operator credential.
    pub operator_credential: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3333,
            db_path: PathBuf::from("satchel.db"),
            upload_dir: PathBuf::from("uploads"),
            operator_credential: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = env::var("SATCHEL_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid port: {}", e)))?;
        }
        if let Ok(db_path) = env::var("SATCHEL_DB") {
            config.db_path = PathBuf::from(db_path);
        }
        if let Ok(upload_dir) = env::var("SATCHEL_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(upload_dir);
        }
        if let Ok(credential) = env::var("SATCHEL_OPERATOR_PASSWORD") {
            config.operator_credential = Some(credential);
        }

        Ok(config)
    }

    /// Address the server binds, all interfaces on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 3333);
        assert_eq!(config.db_path, PathBuf::from("satchel.db"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.operator_credential.is_none());
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3333");
    }

    #[test]
    fn test_env_overrides() {
        // Single test owns these variables so parallel tests never race.
        env::set_var("SATCHEL_PORT", "4040");
        env::set_var("SATCHEL_DB", "/tmp/exchange.db");
        env::set_var("SATCHEL_OPERATOR_PASSWORD", "hunter2");

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 4040);
        assert_eq!(config.db_path, PathBuf::from("/tmp/exchange.db"));
        assert_eq!(config.operator_credential.as_deref(), Some("hunter2"));

        env::set_var("SATCHEL_PORT", "not-a-port");
        assert!(ApiConfig::from_env().is_err());

        env::remove_var("SATCHEL_PORT");
        env::remove_var("SATCHEL_DB");
        env::remove_var("SATCHEL_OPERATOR_PASSWORD");
    }
}
