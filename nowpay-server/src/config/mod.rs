//! Configuration module for nowpay-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables. The result is immutable for the process lifetime.

pub mod file;

use crate::config::file::FileConfig;
use nowpay_sdk::config::{ConfigurationError, IpnSecret};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid IPN secret: {0}")]
    SecretError(#[from] ConfigurationError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated runtime configuration.
#[derive(Debug)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub path: String,
    pub secret: IpnSecret,
    pub callback_timeout: Duration,
    pub reject_unverified: bool,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    secret_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        secret_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            secret_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, config_content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(secret) = &self.secret_override {
            file_config.ipn.secret = secret.clone();
        }

        self.validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            path: file_config.server.path,
            secret: IpnSecret::new(file_config.ipn.secret)?,
            callback_timeout: Duration::from_secs(file_config.ipn.callback_timeout_secs),
            reject_unverified: file_config.ipn.reject_unverified,
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if !config.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "server.path must start with '/', got {:?}",
                config.server.path
            )));
        }
        if config.ipn.callback_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ipn.callback_timeout_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(secret_override: Option<&str>) -> ConfigLoader {
        ConfigLoader::new(
            "./nowpay-ipn.toml",
            None,
            secret_override.map(str::to_owned),
        )
    }

    #[test]
    fn test_load_valid_config() {
        let loaded = loader(None)
            .load_str("[ipn]\nsecret = \"my_secret\"\ncallback_timeout_secs = 10\n")
            .unwrap();
        assert_eq!(loaded.secret.as_bytes(), b"my_secret");
        assert_eq!(loaded.callback_timeout, Duration::from_secs(10));
        assert_eq!(loaded.path, "/");
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let err = loader(None).load_str("[server]\npath = \"/ipn\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SecretError(ConfigurationError::EmptySecret)
        ));
    }

    #[test]
    fn test_secret_override_wins() {
        let loaded = loader(Some("from_env"))
            .load_str("[ipn]\nsecret = \"from_file\"\n")
            .unwrap();
        assert_eq!(loaded.secret.as_bytes(), b"from_env");

        let loaded = loader(Some("from_env")).load_str("").unwrap();
        assert_eq!(loaded.secret.as_bytes(), b"from_env");
    }

    #[test]
    fn test_listen_override() {
        let listen: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = ConfigLoader::new("unused.toml", Some(listen), Some("s".to_owned()))
            .load_str("")
            .unwrap();
        assert_eq!(loaded.listen, listen);
    }

    #[test]
    fn test_validation_errors() {
        let err = loader(Some("s"))
            .load_str("[server]\npath = \"ipn\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = loader(Some("s"))
            .load_str("[ipn]\ncallback_timeout_secs = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
