//! Client configuration.
//!
//! Loaded from a JSON file; every field except `base_url` has a default.
//!
//! ```json
//! { "base_url": "https://notes.example.com", "request_timeout_ms": 10000 }
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::time::Duration;

const MIN_TIMEOUT_MS: u64 = 100;

/// Configuration error for file loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

/// Remote service and engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service origin, e.g. `https://notes.example.com`.
    pub base_url: String,
    /// Path prefix prepended to every endpoint.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How long a deleted note stays restorable.
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_version() -> String {
    "/v1".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    format!("notesync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_undo_window_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl ClientConfig {
    /// Builds a config with defaults for everything but the origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: default_api_version(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            undo_window_ms: default_undo_window_ms(),
            log_level: default_log_level(),
        }
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates JSON config text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                message: format!("expected an http(s) URL, got `{base_url}`"),
            });
        }
        if !self.api_version.is_empty() && !self.api_version.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "api_version",
                message: "must be empty or start with `/`".to_string(),
            });
        }
        if self.request_timeout_ms < MIN_TIMEOUT_MS {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms",
                message: format!("must be at least {MIN_TIMEOUT_MS}"),
            });
        }
        Ok(())
    }

    /// Endpoint root: origin plus API prefix, without trailing slash.
    pub fn api_root(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim().trim_end_matches('/'),
            self.api_version.trim_end_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }
}
