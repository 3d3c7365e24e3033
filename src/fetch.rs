//! Network fetch abstraction.
//!
//! The agent fetches resources through the [`ResourceFetcher`] trait so the
//! protocol can be exercised with scripted fetchers in tests. A successful
//! fetch always carries an HTTP-success status; non-2xx responses surface as
//! [`FetchError::Status`].

use crate::error::FetchError;
use crate::store::CachedResponse;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};

/// Cache behavior for an outgoing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Normal request; intermediate HTTP caches may answer.
    Default,
    /// Bypass intermediate HTTP caches entirely (reload semantics). Used for
    /// shell downloads during installation.
    Reload,
}

/// A response fetched from the network.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Convert into a storable cache record, stamping the store time.
    pub fn into_cached(self) -> CachedResponse {
        CachedResponse {
            status: self.status,
            content_type: self.content_type,
            body: self.body,
            stored_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchedResponse, FetchError>;
}

/// HTTP fetcher over a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchedResponse, FetchError> {
        let mut request = self.client.get(url);
        if mode == FetchMode::Reload {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request.send().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .to_vec();

        Ok(FetchedResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
