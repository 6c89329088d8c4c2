//! Runtime configuration for the board client.
//!
//! Values come from defaults, builder overrides, or `TASKBOARD_*`
//! environment variables.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const BASE_URL_VAR: &str = "TASKBOARD_BASE_URL";
/// Environment variable holding the poll interval in milliseconds.
pub const POLL_INTERVAL_VAR: &str = "TASKBOARD_POLL_INTERVAL_MS";
/// Environment variable holding the request timeout in milliseconds.
pub const REQUEST_TIMEOUT_VAR: &str = "TASKBOARD_REQUEST_TIMEOUT_MS";

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while building a [`BoardConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is blank.
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    /// A duration of zero was supplied where a positive one is required.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// An environment variable could not be parsed.
    #[error("{name} is not a valid number of milliseconds: {value}")]
    InvalidMillis {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Board client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    base_url: String,
    poll_interval: Duration,
    request_timeout: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BoardConfig {
    /// Creates a configuration for `base_url` with default intervals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the URL is blank.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        Self::default().with_base_url(base_url)
    }

    /// Reads the configuration from the process environment. Unset variables
    /// keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparsable or out-of-range values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_VAR) {
            config = config.with_base_url(url)?;
        }
        if let Some(raw) = lookup(POLL_INTERVAL_VAR) {
            config = config.with_poll_interval(parse_millis(POLL_INTERVAL_VAR, &raw)?)?;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            config = config.with_request_timeout(parse_millis(REQUEST_TIMEOUT_VAR, &raw)?)?;
        }
        Ok(config)
    }

    /// Sets the API base URL. A trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] if the URL is blank.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = base_url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        self.base_url = trimmed.to_owned();
        Ok(self)
    }

    /// Sets the interval between refreshes of the selected discussion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll interval"));
        }
        self.poll_interval = interval;
        Ok(self)
    }

    /// Sets the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDuration`] for a zero timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request timeout"));
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Returns the API base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn parse_millis(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidMillis {
            name,
            value: raw.to_owned(),
        })
}
