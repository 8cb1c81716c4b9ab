//! Configuration for the pulpit client.
//!
//! Configuration is read from `~/.config/pulpit/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::client::retry::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES};
use crate::client::RetryPolicy;
use crate::platform::PlatformKind;

/// Backend address baked into the packaged native app.
pub const NATIVE_API_URL: &str = "http://192.168.1.100:5000/api";
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const API_URL_ENV: &str = "PULPIT_API_URL";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub platform: PlatformConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Overrides platform-based selection when set.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub kind: PlatformKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: i64,
    /// Endpoints containing any of these are never cached.
    pub uncached_paths: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: crate::cache::DEFAULT_TTL_HOURS,
            uncached_paths: crate::client::DEFAULT_UNCACHED_PATHS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: crate::transport::http_transport::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_or_create(&config_path)
    }

    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/pulpit/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pulpit").join("config.toml"))
    }

    /// API base URL: config file, then platform, then environment, then localhost.
    pub fn api_url(&self) -> String {
        resolve_api_url(
            self.api.url.as_deref(),
            self.platform.kind,
            std::env::var(API_URL_ENV).ok().as_deref(),
        )
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Pulpit client configuration

[api]
# Backend API base URL. When unset it is chosen by platform:
# native apps use the fixed LAN address, otherwise $PULPIT_API_URL,
# otherwise http://localhost:5000/api
# url = "https://church.example.org/api"

[platform]
# "web" or "native". Native serves cached or empty data when offline
# instead of failing.
kind = "web"

[retry]
# Retries for rate limiting (429) and network failures.
# Delay doubles each time: base, 2*base, 4*base, ...
max_retries = 5
base_delay_ms = 2000

[cache]
# Cached responses older than this are treated as missing
ttl_hours = 24
# Endpoints containing any of these are never cached
uncached_paths = ["/admin"]

[http]
# Transport-level request timeout
timeout_secs = 30
"##
        .to_string()
    }
}

pub fn resolve_api_url(
    configured: Option<&str>,
    kind: PlatformKind,
    env_url: Option<&str>,
) -> String {
    let url = match (configured, kind, env_url) {
        (Some(url), _, _) if !url.trim().is_empty() => url,
        (_, PlatformKind::Native, _) => NATIVE_API_URL,
        (_, _, Some(url)) if !url.trim().is_empty() => url,
        _ => DEFAULT_API_URL,
    };
    url.trim().trim_end_matches('/').to_string()
}

/// Server root for asset links: the API URL without its `/api` suffix.
pub fn backend_url(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    trimmed
        .strip_suffix("/api")
        .unwrap_or(trimmed)
        .to_string()
}

/// Absolute link for an uploaded asset such as `/uploads/cover.jpg`.
pub fn asset_url(backend_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = backend_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
