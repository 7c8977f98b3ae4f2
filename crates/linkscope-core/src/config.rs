use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::feed::FeedOptions;
use crate::retry::RetryPolicy;

/// Retry policy parameters for feed runs (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per feed run (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/linkscope/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkscopeConfig {
    /// User-Agent sent by HTTP sessions.
    pub user_agent: String,
    /// TCP connect timeout for HTTP sessions.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for HTTP sessions.
    pub request_timeout_secs: u64,
    /// Maximum number of feeds run at the same time.
    pub max_concurrent_feeds: usize,
    /// Optional page bound applied to every feed run (None = follow cursors to the end).
    #[serde(default)]
    pub max_pages: Option<usize>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for LinkscopeConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("linkscope/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            max_concurrent_feeds: 4,
            max_pages: None,
            retry: None,
        }
    }
}

impl LinkscopeConfig {
    /// Retry policy from the `[retry]` section, or the built-in default.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            max_pages: self.max_pages,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("linkscope")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<LinkscopeConfig> {
    let path = config_path()?;
    if !path.exists() {
        return write_default(&path);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path (no default file is created).
pub fn load_from_path(path: &Path) -> Result<LinkscopeConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: LinkscopeConfig = toml::from_str(&data)?;
    Ok(cfg)
}

fn write_default(path: &Path) -> Result<LinkscopeConfig> {
    let default_cfg = LinkscopeConfig::default();
    let toml = toml::to_string_pretty(&default_cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    tracing::info!("created default config at {}", path.display());
    Ok(default_cfg)
}
