//! Run configuration.
//!
//! Loaded from a TOML file when one is given or found in the user config
//! directory; every key is optional and falls back to the defaults below.
//!
//! ```toml
//! ticker = "AAPL"
//! lookback_days = 30
//!
//! [retry]
//! attempts = 3
//! delay_secs = 2
//!
//! [fallback]
//! base_url = "https://query1.finance.yahoo.com/v7/finance/chart"
//! user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
//! # timeout_secs = 30
//!
//! [output]
//! dir = "."
//! interactive = true
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::data::retry::RetryPolicy;
use crate::request::{FetchRequest, RequestError, DEFAULT_LOOKBACK_DAYS};

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v7/finance/chart";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ticker: String,
    pub lookback_days: u32,
    pub retry: RetryConfig,
    pub fallback: FallbackConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            retry: RetryConfig::default(),
            fallback: FallbackConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Primary source retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 2,
        }
    }
}

/// Chart endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Unset leaves the HTTP client's own default in place.
    pub timeout_secs: Option<u64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHART_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Show the terminal chart after writing the PNG.
    pub interactive: bool,
    /// TrueType font for PNG labels. Common system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            interactive: true,
            font_path: None,
        }
    }
}

impl Config {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `$CONFIG_DIR/closeplot/config.toml`, e.g. `~/.config/closeplot/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("closeplot").join("config.toml"))
    }

    /// Explicit path if given (must exist), else the default path if present,
    /// else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("ticker must not be empty".into()));
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid("lookback_days must be at least 1".into()));
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry.attempts must be at least 1".into()));
        }
        if self.fallback.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback.base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Build the request, rejecting lookbacks that cannot be turned into a
    /// date window.
    pub fn request(&self) -> Result<FetchRequest, RequestError> {
        let request = FetchRequest::new(&self.ticker, self.lookback_days)?;
        request.window(Utc::now())?;
        Ok(request)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.attempts, Duration::from_secs(self.retry.delay_secs))
    }
}
