//! Application configuration.
//!
//! Read from `config.toml` in the platform config directory. A missing file
//! yields the defaults; `CATALOG_ADMIN_API_URL` overrides the API base URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::domain::entities::table::DEFAULT_PAGE_SIZE;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const API_URL_ENV: &str = "CATALOG_ADMIN_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "https://fakestoreapi.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No suitable config directory available")]
    NoConfigDir,
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid API base URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must be at most {max}")]
    OutOfRange { field: &'static str, max: u64 },
}

/// Cookie expiries are stored as RFC 3339 timestamps, so keep them within
/// four-digit years.
pub const MAX_SESSION_AGE_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_base_url: String,
    page_size: usize,
    session_max_age_secs: u64,
    request_timeout_secs: u64,
    image_max_bytes: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            session_max_age_secs: 3600,
            request_timeout_secs: 30,
            image_max_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub page_size: usize,
    pub session_max_age: Duration,
    pub request_timeout: Duration,
    pub image_max_bytes: u64,
}

impl AppConfig {
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_raw(RawConfig::default(), None)
    }

    /// Loads from the platform config directory.
    pub fn load() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("com", "hellhbbd", "catalog-admin")
            .ok_or(ConfigError::NoConfigDir)?;
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::load_from(&dirs.config_dir().join(CONFIG_FILE_NAME), env_url.as_deref())
    }

    pub fn load_from(path: &Path, env_url: Option<&str>) -> Result<Self, ConfigError> {
        let raw = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            RawConfig::default()
        };
        Self::from_raw(raw, env_url)
    }

    fn from_raw(raw: RawConfig, env_url: Option<&str>) -> Result<Self, ConfigError> {
        let url_text = env_url
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&raw.api_base_url);
        let api_base_url = Url::parse(url_text).map_err(|source| ConfigError::InvalidUrl {
            value: url_text.to_string(),
            source,
        })?;
        if raw.page_size == 0 {
            return Err(ConfigError::Zero { field: "page_size" });
        }
        if raw.session_max_age_secs == 0 {
            return Err(ConfigError::Zero {
                field: "session_max_age_secs",
            });
        }
        if raw.session_max_age_secs > MAX_SESSION_AGE_SECS {
            return Err(ConfigError::OutOfRange {
                field: "session_max_age_secs",
                max: MAX_SESSION_AGE_SECS,
            });
        }
        if raw.request_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "request_timeout_secs",
            });
        }
        if raw.image_max_bytes == 0 {
            return Err(ConfigError::Zero {
                field: "image_max_bytes",
            });
        }
        Ok(Self {
            api_base_url,
            page_size: raw.page_size,
            session_max_age: Duration::from_secs(raw.session_max_age_secs),
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
            image_max_bytes: raw.image_max_bytes,
        })
    }

    /// `None` only for ages that `from_raw` would have rejected.
    pub fn session_max_age_chrono(&self) -> Option<chrono::Duration> {
        i64::try_from(self.session_max_age.as_secs())
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }
}
