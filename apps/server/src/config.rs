use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use givd_core::constants::DEFAULT_FEED_LIMIT;

/// Which store implementation backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted backend reached over HTTP.
    Remote,
    /// Process-local store, nothing persisted.
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "memory" => Ok(BackendKind::Memory),
            other => Err(anyhow!("Unknown GIVD_BACKEND '{}' (expected remote|memory)", other)),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub backend: BackendKind,
    pub backend_url: Option<String>,
    pub backend_anon_key: Option<String>,
    pub feed_limit: usize,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("GIVD_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid GIVD_LISTEN_ADDR")?;
        let backend = std::env::var("GIVD_BACKEND")
            .unwrap_or_else(|_| "memory".into())
            .parse()?;
        let backend_url = std::env::var("GIVD_BACKEND_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let backend_anon_key = std::env::var("GIVD_BACKEND_ANON_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let feed_limit: usize = std::env::var("GIVD_FEED_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_FEED_LIMIT);
        let cors_allow = std::env::var("GIVD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("GIVD_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        Ok(Self {
            listen_addr,
            backend,
            backend_url,
            backend_anon_key,
            feed_limit,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// In-memory configuration with defaults, independent of the environment.
    pub fn in_memory() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            backend: BackendKind::Memory,
            backend_url: None,
            backend_anon_key: None,
            feed_limit: DEFAULT_FEED_LIMIT,
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("Remote".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert_eq!(" memory ".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("sqlite".parse::<BackendKind>().is_err());
    }
}
