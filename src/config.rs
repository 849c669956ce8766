//! Configuration management for the feed client.
//!
//! Handles loading and saving configuration from JSONC files and
//! normalizing it before a client is built.

use anyhow::{Context, Result};
use dirs::config_dir;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::youtube::models::ResponseFormat;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://gdata.youtube.com/feeds/";

/// Feed client configuration.
///
/// Set once when the client is built; only the debug flag can change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Developer key sent as `X-GData-Key`
    pub developer_key: Option<String>,
    /// Prefix every feed path is appended to
    pub base_url: String,
    /// Response serialization requested from the server
    pub format: ResponseFormat,
    /// Treat non-2xx responses as errors
    pub strict_status: bool,
    /// Request timeout in seconds; no timeout when unset
    pub timeout_secs: Option<u64>,
    /// Initial state of the debug flag
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            developer_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            format: ResponseFormat::Atom,
            strict_status: false,
            timeout_secs: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Replace the developer key.
    pub fn with_developer_key(mut self, key: impl Into<String>) -> Self {
        self.developer_key = Some(key.into());
        self
    }

    /// Map empty values to their documented defaults and check the base URL.
    ///
    /// # Returns
    /// * `Result<ClientConfig>` - Normalized configuration or error
    ///
    /// # Details
    /// An empty developer key counts as no key, and an empty base URL falls
    /// back to [`DEFAULT_BASE_URL`]. The base URL must be an absolute
    /// `http` or `https` URL. Feed paths are appended to it verbatim, so it
    /// normally ends with `/`.
    pub fn normalized(mut self) -> Result<Self> {
        if self
            .developer_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.developer_key = None;
        }

        if self.base_url.trim().is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }

        let parsed = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Base URL must use http or https: {}",
                self.base_url
            ));
        }

        Ok(self)
    }

    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<ClientConfig>` - Loaded configuration or error
    ///
    /// # Details
    /// Searches for config file in:
    /// 1. Provided path (if given)
    /// 2. `$XDG_CONFIG_HOME/yt-feeds/config.jsonc`
    /// 3. `~/.config/yt-feeds/config.jsonc`
    ///
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: ClientConfig = serde_json::from_str(&strip_line_comments(&content))
            .with_context(|| "Failed to deserialize config")?;

        Ok(config)
    }

    /// Save configuration to file.
    ///
    /// # Details
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, json)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get default configuration file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - `<config dir>/yt-feeds/config.jsonc` or error
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(config_dir.join("yt-feeds").join("config.jsonc"))
    }
}

/// Strip `//` comments from JSONC content.
///
/// A `//` preceded by an odd number of quotes on its line is inside a string
/// (as in `"http://..."`) and is skipped. Escaped quotes are not handled.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            line.match_indices("//")
                .find(|(pos, _)| line[..*pos].matches('"').count() % 2 == 0)
                .map_or(line, |(pos, _)| line[..pos].trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
