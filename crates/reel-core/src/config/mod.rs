//! Remote service configuration.
//!
//! Provides `ApiConfig`, the endpoint and transport settings used to build
//! the movie API client. Values come from defaults, the environment, or the
//! CLI, and are normalized the same way regardless of source.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

const API_URL_ENV: &str = "REEL_API_URL";
const API_TIMEOUT_ENV: &str = "REEL_API_TIMEOUT_SECS";
const API_LOG_BODIES_ENV: &str = "REEL_API_LOG_BODIES";

/// Settings for the remote movie service client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL without trailing slash (e.g. `http://localhost:3000`)
    pub base_url: String,
    /// Connect/read/write timeout applied to every request
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Log request and response bodies at debug level
    #[serde(default)]
    pub log_bodies: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            log_bodies: false,
        }
    }
}

impl ApiConfig {
    /// Create a config for the given base URL with default transport settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            ..Self::default()
        })
    }

    /// Build a config from `REEL_API_URL`, `REEL_API_TIMEOUT_SECS` and
    /// `REEL_API_LOG_BODIES`, falling back to defaults for unset values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = normalize_text_option(lookup(API_URL_ENV)) {
            config.base_url = normalize_base_url(url)?;
        }

        if let Some(raw) = normalize_text_option(lookup(API_TIMEOUT_ENV)) {
            let secs: u64 = raw.parse().map_err(|_| {
                Error::InvalidInput(format!("{API_TIMEOUT_ENV} must be a whole number of seconds"))
            })?;
            if secs == 0 {
                return Err(Error::InvalidInput(format!(
                    "{API_TIMEOUT_ENV} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = normalize_text_option(lookup(API_LOG_BODIES_ENV)) {
            config.log_bodies = matches!(
                raw.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(config)
    }

    /// Replace the base URL, keeping transport settings.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        self.base_url = normalize_base_url(base_url.into())?;
        Ok(self)
    }

    /// Full URL for a path relative to the base (e.g. `movies/3`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Trim, require an http(s) scheme, and strip trailing slashes.
pub fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::InvalidInput("API base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
