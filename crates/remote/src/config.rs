//! Connection settings for the hosted backend.

use std::time::Duration;

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Where the hosted backend lives and how to reach it.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyzcompany.backend.example`
    pub base_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn realtime_url(&self) -> String {
        format!("{}/realtime/v1/stream", self.base_url)
    }
}
