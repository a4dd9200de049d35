// Client configuration
//
// Layers, later wins:
// 1. Built-in defaults
// 2. <config_dir>/video-links/config.json
// 3. VIDEO_DOWNLOADER_* environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::errors::LookupError;

pub const ENV_API_URL: &str = "VIDEO_DOWNLOADER_API_URL";
pub const ENV_API_KEY: &str = "VIDEO_DOWNLOADER_API_KEY";
pub const ENV_TIMEOUT: &str = "VIDEO_DOWNLOADER_TIMEOUT";
pub const ENV_PROXY: &str = "VIDEO_DOWNLOADER_PROXY";

/// Connection settings for the link service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend (no trailing slash needed)
    pub api_url: String,
    /// Sent as `X-API-Key` on every call
    pub api_key: String,
    /// Request timeout in seconds, `None` leaves it to the transport
    pub timeout_seconds: Option<u32>,
    /// HTTP or SOCKS5 proxy URL (e.g., "socks5h://127.0.0.1:1080")
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            api_key: String::new(),
            timeout_seconds: Some(30),
            proxy: None,
        }
    }
}

impl ClientConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_timeout(mut self, seconds: Option<u32>) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("video-links").join("config.json"))
    }

    /// Defaults, then the user config file, then environment
    pub fn load() -> Result<Self, LookupError> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        base.apply_env(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, LookupError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LookupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            LookupError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded client config");
        Ok(config)
    }

    /// Overlay values from an environment lookup
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, LookupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT).filter(|v| !v.trim().is_empty()) {
            let seconds = raw.trim().parse::<u32>().map_err(|_| {
                LookupError::Config(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, raw))
            })?;
            // 0 disables the client-side timeout
            self.timeout_seconds = (seconds > 0).then_some(seconds);
        }
        if let Some(proxy) = lookup(ENV_PROXY) {
            self.proxy = Some(proxy).filter(|p| !p.trim().is_empty());
        }
        Ok(self)
    }

    /// Full URL for an API path such as `/api/video-info`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
