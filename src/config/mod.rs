//! Configuration management for the lowdown server
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. The resulting values are injected into the API
//! layer at construction time; nothing reads configuration through global
//! mutable state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Web scraper configuration
    pub scraper: ScraperConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    pub bind_address: SocketAddr,

    /// Enable permissive CORS
    pub enable_cors: bool,

    /// Enable per-request tracing
    pub enable_request_logging: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Web scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string sent with scrape requests
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bind_address = std::env::var("LOWDOWN_BIND_ADDRESS")
            .unwrap_or_else(|_| String::from("127.0.0.1:8000"))
            .parse::<SocketAddr>()
            .context("Invalid LOWDOWN_BIND_ADDRESS")?;

        let enable_cors = std::env::var("LOWDOWN_ENABLE_CORS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        let sqlite_path = std::env::var("LOWDOWN_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/lowdown.db"))
            .into();

        let request_timeout_secs = std::env::var("LOWDOWN_SCRAPE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(15);

        let user_agent = std::env::var("LOWDOWN_USER_AGENT").unwrap_or_else(|_| {
            String::from(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )
        });

        let log_level = std::env::var("LOWDOWN_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("LOWDOWN_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            server: ServerConfig {
                bind_address,
                enable_cors,
                enable_request_logging: true,
            },
            database: DatabaseConfig { sqlite_path },
            scraper: ScraperConfig {
                request_timeout_secs,
                user_agent,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scraper.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.scraper.user_agent.is_empty() {
            anyhow::bail!("user_agent must not be empty");
        }

        if self.database.sqlite_path.as_os_str().is_empty() {
            anyhow::bail!("sqlite_path must not be empty");
        }

        Ok(())
    }
}

impl ScraperConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1:8000".parse().expect("valid default address"),
                enable_cors: true,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/lowdown.db"),
            },
            scraper: ScraperConfig {
                request_timeout_secs: 15,
                user_agent: String::from(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
                ),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.scraper.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.scraper.user_agent = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.scraper.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:9000"
            enable_cors = false
            enable_request_logging = true

            [database]
            sqlite_path = "test/lowdown.db"

            [scraper]
            request_timeout_secs = 30
            user_agent = "lowdown-test/1.0"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address.port(), 9000);
        assert!(!config.server.enable_cors);
        assert_eq!(config.scraper.request_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }
}
