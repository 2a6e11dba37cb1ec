//! Server configuration
//!
//! Built-in defaults, optionally overlaid by a TOML file and then by
//! environment variables.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "HASHBUCKET_CONFIG";

/// Default listen address: all interfaces, fixed port
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,hashbucket=debug";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_address: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Export traces over OTLP
    pub otel_enabled: bool,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            request_timeout_secs: 30,
            otel_enabled: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults, then the file named by `HASHBUCKET_CONFIG` (or `path`), then env overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var(CONFIG_PATH_ENV).ok();
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| from_env.map(Into::into));

        let mut config = match file {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `BIND_ADDRESS`, `REQUEST_TIMEOUT_SECS` and `OTEL_ENABLED`
    ///
    /// `lookup` abstracts the environment so tests don't mutate process state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.parse().map_err(|_| {
                ConfigError::Invalid(format!("REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        if let Some(flag) = lookup("OTEL_ENABLED") {
            self.otel_enabled = flag.parse().unwrap_or(false);
        }
        Ok(())
    }

    /// Semantic checks that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("bind_address is not a socket address: {}", self.bind_address))
        })
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "0.0.0.0:5000");
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.otel_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml_str("request_timeout_secs = 5\n").unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ServerConfig::from_toml_str("bind_address = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_bad_address() {
        let err = ServerConfig::from_toml_str("bind_address = \"not-an-address\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = ServerConfig::from_toml_str("request_timeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("OTEL_ENABLED", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, 3);
        assert!(config.otel_enabled);
    }

    #[test]
    fn test_env_override_bad_timeout() {
        let mut config = ServerConfig::default();
        let result = config.apply_env_overrides(|k| {
            (k == "REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = \"127.0.0.1:6000\"").unwrap();
        writeln!(file, "otel_enabled = false").unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:6000");
    }

    #[test]
    fn test_missing_file() {
        let err = ServerConfig::from_file("/nonexistent/hashbucket.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
