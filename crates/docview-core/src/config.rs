//! Configuration management for docview.
//!
//! Settings are stored in TOML. Lookup order, first hit wins:
//!
//! 1. The file named by `DOCVIEW_CONFIG`
//! 2. `config.toml` in the platform config directory
//! 3. Built-in defaults
//!
//! `DOCVIEW_API_URL` then overrides `api.base_url` whichever source was used.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! timeout_secs = 30
//!
//! [search]
//! debounce_ms = 300
//!
//! [scroll_spy]
//! window_ratio = 0.2
//! threshold = 0.1
//! ```
//!
//! ```rust
//! use docview_core::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.search.debounce_ms, 300);
//! assert!(config.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DOCVIEW_CONFIG";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "DOCVIEW_API_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Query controller settings.
    pub search: SearchConfig,
    /// Scroll spy activation window.
    pub scroll_spy: ScrollSpyConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the search backend; endpoints are resolved against it.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Query controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a changed query is sent.
    pub debounce_ms: u64,
}

/// Scroll spy activation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSpyConfig {
    /// Height of the activation window as a fraction of the viewport,
    /// measured from the top.
    pub window_ratio: f64,
    /// Fraction of an element that must be inside the window to count.
    pub threshold: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            window_ratio: 0.2,
            threshold: 0.1,
        }
    }
}

impl SearchConfig {
    /// Debounce quiet period as a `Duration`.
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from `DOCVIEW_CONFIG`, the platform config file, or
    /// defaults, then apply `DOCVIEW_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed,
    /// or if the result fails [`Config::validate`].
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from(Path::new(&path))?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => Self::default(),
            },
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("{API_URL_ENV} overrides api.base_url");
                config.api.base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Platform location of `config.toml`, if one can be determined.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "docview", "docview")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.search.debounce_ms == 0 {
            return Err(Error::Config("search.debounce_ms must be positive".into()));
        }
        for (name, value) in [
            ("scroll_spy.window_ratio", self.scroll_spy.window_ratio),
            ("scroll_spy.threshold", self.scroll_spy.threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::Config(format!("{name} must be in (0, 1], got {value}")));
            }
        }
        Ok(())
    }
}
