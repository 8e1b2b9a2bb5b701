//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash.
    pub base_url: String,
    pub timeouts: Timeouts,
    pub search_debounce_ms: u64,
    pub page_size: u32,
    /// Raw `Cookie` header sent on every request instead of a cookie store.
    pub cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
            cookie: None,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `COMPANION_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `COMPANION_REQUEST_TIMEOUT_SECS`: default 30
    /// - `COMPANION_CONNECT_TIMEOUT_SECS`: default 10
    /// - `COMPANION_SEARCH_DEBOUNCE_MS`: default 300
    /// - `COMPANION_PAGE_SIZE`: default 12
    /// - `COMPANION_COOKIE`: raw `Cookie` header for headless sessions
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a numeric variable does not parse, the
    /// page size is zero, or the base URL has no HTTP scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("COMPANION_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse("COMPANION_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("COMPANION_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let search_debounce_ms = env_parse("COMPANION_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;
        let page_size = env_parse("COMPANION_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue { var: "COMPANION_PAGE_SIZE", value: "0".to_owned() });
        }
        let cookie = std::env::var("COMPANION_COOKIE")
            .ok()
            .filter(|raw| !raw.trim().is_empty());

        Ok(Self { base_url, timeouts, search_debounce_ms, page_size, cookie })
    }

    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Validate the scheme and strip trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for anything that is not an
/// `http`/`https` URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_parse<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        Err(_) => Ok(default),
    }
}
