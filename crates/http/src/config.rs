//! Client configuration
//!
//! Values come from built-in defaults, then an optional config file, then
//! `BUKLOAD_*` environment variables.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::client::{ClientError, DEFAULT_TIMEOUT};

/// Prefix of environment variables overriding configuration values
pub const ENV_PREFIX: &str = "BUKLOAD";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Settings needed to build a [`BukloadClient`](crate::BukloadClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,

    /// Transport timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Directory holding the persisted token pair
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: concat!("bukload-client/", env!("CARGO_PKG_VERSION")).to_string(),
            state_dir: default_state_dir(),
        }
    }
}

/// Platform data directory for Bukload, or `./.bukload` when none exists
pub fn default_state_dir() -> PathBuf {
    ProjectDirs::from("com", "bukload", "bukload").map_or_else(
        || {
            warn!("Failed to determine platform-specific directories, using ./.bukload");
            PathBuf::from(".bukload")
        },
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

impl ClientConfig {
    /// Load configuration from defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> Result<Self, ClientError> {
        Self::load(None)
    }

    /// Load configuration from file, with environment variables on top
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        Self::load(Some(path.as_ref()))
    }

    fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)
            .and_then(|b| b.set_default("timeout_secs", defaults.timeout_secs))
            .and_then(|b| b.set_default("user_agent", defaults.user_agent))
            .and_then(|b| {
                b.set_default(
                    "state_dir",
                    defaults.state_dir.to_string_lossy().to_string(),
                )
            })
            .map_err(config_error)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Configuration(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn config_error(e: config::ConfigError) -> ClientError {
    ClientError::Configuration(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"https://api.bukload.example\"").unwrap();
        writeln!(file, "timeout_secs = 30").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://api.bukload.example");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.user_agent, ClientConfig::default().user_agent);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = ClientConfig {
            base_url: "ftp://example.com".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.validate(), Err(ClientError::Configuration(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
