//! HTTP asset fetching.

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

use super::Fetcher;
use crate::error::{AssetCacheError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("assetcache/", env!("CARGO_PKG_VERSION"));

/// Fetches assets over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default 30-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP fetcher with custom timeout and user agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AssetCacheError::Other(anyhow::Error::new(e).context("Failed to build HTTP client"))
            })?;

        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let transport = |source: reqwest::Error| AssetCacheError::Transport {
            url: url.to_string(),
            source: Box::new(source),
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            return Err(AssetCacheError::BadResponse {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}
