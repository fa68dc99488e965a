#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Tradewire Configuration
//!
//! This crate provides configuration management for the tradewire client.
//! It handles loading, saving, and overriding configuration files that specify:
//! - API connection settings (base URL, timeout, retries, user agent)
//! - Logging configuration
//!
//! Configuration is stored in TOML format. Every field has a default, so a
//! file only needs the settings it changes. Environment variables
//! (`TRADEWIRE_BASE_URL`, `TRADEWIRE_TIMEOUT_SECS`, `TRADEWIRE_MAX_RETRIES`,
//! `TRADEWIRE_LOG`) take precedence over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_BASE_URL: &str = "TRADEWIRE_BASE_URL";
/// Environment variable overriding [`ClientConfig::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "TRADEWIRE_TIMEOUT_SECS";
/// Environment variable overriding [`ClientConfig::max_retries`].
pub const ENV_MAX_RETRIES: &str = "TRADEWIRE_MAX_RETRIES";
/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG: &str = "TRADEWIRE_LOG";

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
    /// A setting has a value the client cannot work with
    #[error("Invalid setting `{key}`: {reason}")]
    Invalid {
        /// Setting name
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API connection settings
    pub client: ClientConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// API connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_retry_delay_ms: u64,
    /// Upper bound for any retry delay, in milliseconds
    pub max_retry_delay_ms: u64,
    /// `User-Agent` header value; the client default when unset
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

    /// Delay before the first retry.
    pub fn initial_retry_delay(&self) -> Duration {
        Duration::from_millis(self.initial_retry_delay_ms)
    }

    /// Upper bound for any retry delay.
    pub fn max_retry_delay(&self) -> Duration { Duration::from_millis(self.max_retry_delay_ms) }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (debug, info, warn, error, `tradewire=trace`)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/tradewire/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("tradewire");
        Ok(config_dir.join("config.toml"))
    }

    /// Load the effective configuration: the file at `path` (or the default
    /// path) when it exists, defaults otherwise, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        let mut config = if path.exists() { Self::from_file(&path)? } else { Self::default() };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TRADEWIRE_*` environment variables on top of this configuration.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Internal function for testing - allows injection of environment values
    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, raw: String) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::Invalid {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
        }

        if let Some(url) = lookup(ENV_BASE_URL) {
            self.client.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.client.timeout_secs = parse(ENV_TIMEOUT_SECS, raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            self.client.max_retries = parse(ENV_MAX_RETRIES, raw)?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Check settings that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.client.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "client.base_url".to_string(),
                reason: format!("expected an http(s) URL, got '{}'", url),
            });
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "client.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.client.initial_retry_delay_ms > self.client.max_retry_delay_ms {
            return Err(ConfigError::Invalid {
                key: "client.initial_retry_delay_ms".to_string(),
                reason: "must not exceed client.max_retry_delay_ms".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [client]
            base_url = "https://api.example.com/v1"
            timeout_secs = 10
            max_retries = 5
            user_agent = "warehouse-sync/2.1"

            [logging]
            level = "debug"
            file = "tradewire.log"
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let loaded_config =
            Config::from_file(&temp_file).expect("Failed to load config from temporary file");
        assert_eq!(loaded_config.client.base_url, "https://api.example.com/v1");
        assert_eq!(loaded_config.client.timeout(), Duration::from_secs(10));
        assert_eq!(loaded_config.client.max_retries, 5);
        assert_eq!(loaded_config.client.user_agent.as_deref(), Some("warehouse-sync/2.1"));
        // Unspecified settings keep their defaults
        assert_eq!(loaded_config.client.initial_retry_delay_ms, 500);
        assert_eq!(loaded_config.logging.level, "debug");
        assert_eq!(loaded_config.logging.file, Some(PathBuf::from("tradewire.log")));

        // Test file not found error
        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        // Test parse error
        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for parse error test");
        fs::write(&temp_file, "invalid toml content")
            .expect("Failed to write invalid TOML content");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_round_trip() {
        let mut config = Config::default();
        config.client.base_url = "https://api.example.com".to_string();
        let temp_file =
            NamedTempFile::new().expect("Failed to create temporary file for save test");

        config.save(&temp_file).expect("Failed to save config");
        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config file");
        assert!(contents.contains("[client]"));
        assert!(contents.contains("https://api.example.com"));
        assert_eq!(Config::from_file(&temp_file).expect("Failed to reload config"), config);

        // Test file write error - try to save to a non-existent directory
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let non_existent_subdir = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&non_existent_subdir).expect_err("Expected file write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("tradewire"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://staging.example.com"),
            (ENV_TIMEOUT_SECS, " 5 "),
            (ENV_LOG, "tradewire=trace"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides_from(|key| env.get(key).map(|value| value.to_string()))
            .expect("Failed to apply overrides");
        assert_eq!(config.client.base_url, "https://staging.example.com");
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.client.max_retries, 2);
        assert_eq!(config.logging.level, "tradewire=trace");

        let err = Config::default()
            .apply_overrides_from(|key| (key == ENV_MAX_RETRIES).then(|| "many".to_string()))
            .expect_err("Expected invalid retry count");
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == ENV_MAX_RETRIES));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let config = Config::load(Some(&temp_dir.path().join("absent.toml")));
        // Environment overrides may apply on developer machines; only check it loads.
        if std::env::var(ENV_BASE_URL).is_err() {
            assert_eq!(config.expect("Failed to load defaults").client, ClientConfig::default());
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.client.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = Config::default();
        config.client.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.client.initial_retry_delay_ms = 10_000;
        assert!(config.validate().is_err());
    }
}
