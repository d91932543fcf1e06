//! Loader configuration (blog.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable overriding [`LoaderConfig::api_base_url`]
pub const API_BASE_URL_ENV: &str = "BLOG_API_BASE_URL";

/// Settings for the content loader, the HTTP client and the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    // Backend
    pub api_base_url: String,
    /// Origin the pages are served from; links to other origins are not
    /// routed. Unset means the same origin as `api_base_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub request_timeout_secs: u64,

    // Cache
    pub cache_ttl_secs: u64,

    // Site
    pub site_title: String,
    pub date_format: String,

    // Rendering
    pub highlight_theme: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            origin: None,
            request_timeout_secs: 10,

            cache_ttl_secs: 300,

            site_title: "Blog".to_string(),
            date_format: "YYYY-MM-DD".to_string(),

            highlight_theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: LoaderConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
    }

    /// Origin used for the same-origin check on link clicks
    pub fn origin(&self) -> &str {
        match self.origin.as_deref().map(str::trim) {
            Some(origin) if !origin.is_empty() => origin,
            _ => &self.api_base_url,
        }
    }

    /// Cache time-to-live
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Per-request timeout for the HTTP transport
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Page title for a route, e.g. `About - My Blog`
    pub fn page_title(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{} - {}", prefix, self.site_title),
            _ => self.site_title.clone(),
        }
    }
}
