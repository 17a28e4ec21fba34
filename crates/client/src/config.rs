//! Client configuration.

use std::time::Duration;

use crate::error::ClientError;

/// Env var holding the API base URL.
pub const API_URL_ENV: &str = "GASPORTAL_API_URL";

/// Env var holding an optional per-request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "GASPORTAL_HTTP_TIMEOUT_SECS";

/// Local development API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_url: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Read [`API_URL_ENV`] and [`TIMEOUT_ENV`] from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let api_url = lookup(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "{API_URL_ENV} must be an http(s) URL, got `{api_url}`"
            )));
        }

        let mut config = Self::new(api_url);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("{TIMEOUT_ENV} must be whole seconds, got `{raw}`"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Absolute URL of an API path (e.g. `/modules/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
