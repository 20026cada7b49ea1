//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration files (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 5000)
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin is accepted.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Directory holding a built client bundle to serve at `/`
    pub static_dir: Option<PathBuf>,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Socket address string for the listener, e.g. "127.0.0.1:5000"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Pool size
    pub max_connections: u32,
    /// Upper bound for any single store operation
    pub query_timeout_seconds: u64,
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }
}

/// HTTP API behaviour
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub failure_status: FailureStatusMode,
}

/// How business failures (duplicate email, bad credentials, missing record)
/// are reported at the transport level
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailureStatusMode {
    /// Proper 4xx status codes
    #[default]
    Strict,
    /// HTTP 200 with `success: false` in the body
    Legacy,
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Expose `/metrics`
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (TASKBOARD__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.max_body_bytes", 1_048_576)?
            .set_default("database.path", "data/taskboard.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.query_timeout_seconds", 10)?
            .set_default("api.failure_status", "strict")?
            .set_default("metrics.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (TASKBOARD__*)
            .add_source(
                Environment::with_prefix("TASKBOARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        if self.database.query_timeout_seconds == 0 {
            return Err(AppError::Config(
                "database.query_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(AppError::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(AppError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        for origin in &self.server.cors_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(AppError::Config(format!(
                    "server.cors_origins contains an invalid origin: {origin:?}"
                )));
            }
        }

        if let Some(dir) = &self.server.static_dir {
            if !dir.is_dir() {
                return Err(AppError::Config(format!(
                    "server.static_dir is not a directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                cors_origins: Vec::new(),
                static_dir: None,
                max_body_bytes: 1_048_576,
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/taskboard-test.db"),
                max_connections: 5,
                query_timeout_seconds: 10,
            },
            api: ApiConfig::default(),
            metrics: MetricsConfig { enabled: true },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.api.failure_status, FailureStatusMode::Strict);
    }

    #[test]
    fn validate_rejects_zero_query_timeout() {
        let mut config = valid_config();
        config.database.query_timeout_seconds = 0;

        let error = config
            .validate()
            .expect_err("a zero timeout would fail every store call");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("query_timeout_seconds")
        ));
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = valid_config();
        config.logging.format = "xml".to_string();

        let error = config.validate().expect_err("only pretty/json are known");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("logging.format")
        ));
    }

    #[test]
    fn validate_rejects_missing_static_dir() {
        let mut config = valid_config();
        config.server.static_dir = Some(PathBuf::from("/definitely/not/here/taskboard"));

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_cors_origin() {
        let mut config = valid_config();
        config.server.cors_origins = vec!["https://ok.example.com".to_string(), "bad\norigin".to_string()];

        assert!(config.validate().is_err());
    }

    #[test]
    fn failure_status_mode_parses_lowercase() {
        let api: ApiConfig = serde_json::from_str(r#"{"failure_status":"legacy"}"#).unwrap();
        assert_eq!(api.failure_status, FailureStatusMode::Legacy);

        let api: ApiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(api.failure_status, FailureStatusMode::Strict);
    }
}
