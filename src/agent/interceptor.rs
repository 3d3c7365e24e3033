//! Request interception.
//!
//! Steady-state handler for requests from controlled pages. Only GET
//! requests for manifest-tracked paths are answered; everything else is
//! declined so default networking applies. The entry document is served
//! online-first, all other tracked resources cache-first with lazy fill.

use super::{LifecycleState, SyncAgent};
use crate::error::AgentError;
use crate::fetch::FetchMode;
use crate::manifest::ROOT_PATH;
use crate::routing::normalize_request_path;
use crate::store::{CachedResponse, Namespace};
use tracing::{debug, warn};

/// Outcome of running the interceptor against one request.
#[derive(Debug)]
pub enum InterceptOutcome {
    /// The request is not governed by the agent; the caller should fall
    /// through to normal networking.
    Decline,
    /// The agent produced a response.
    Respond(CachedResponse),
}

impl SyncAgent {
    /// Intercept one outgoing request.
    ///
    /// Errors are real failures (network down with no cached copy, store
    /// fault); a request the agent simply does not govern is `Decline`, not
    /// an error.
    pub async fn intercept(&self, method: &str, url: &str) -> Result<InterceptOutcome, AgentError> {
        if method != "GET" {
            return Ok(InterceptOutcome::Decline);
        }
        if self.state() != LifecycleState::Active {
            return Ok(InterceptOutcome::Decline);
        }

        let path = match normalize_request_path(url, &self.origin) {
            Some(path) => path,
            None => return Ok(InterceptOutcome::Decline),
        };
        if !self.manifest.contains(&path) {
            return Ok(InterceptOutcome::Decline);
        }

        let response = if path == ROOT_PATH {
            self.online_first(&path, url).await?
        } else {
            self.cache_first(&path, url).await?
        };
        Ok(InterceptOutcome::Respond(response))
    }

    /// Cache-first with lazy fill: an exact content hit is returned as-is; a
    /// miss fetches from the network and caches the copy on HTTP success.
    async fn cache_first(&self, path: &str, url: &str) -> Result<CachedResponse, AgentError> {
        if let Some(hit) = self.store.get(Namespace::Content, path)? {
            debug!(path, "serving from content cache");
            return Ok(hit);
        }

        let fetched = self.fetcher.fetch(url, FetchMode::Default).await?;
        let cached = fetched.into_cached();
        // The stored record is an independent copy; the caller's body is
        // unaffected by the cache write.
        self.store.put(Namespace::Content, path, &cached)?;
        debug!(path, "cache miss filled from network");
        Ok(cached)
    }

    /// Online-first for the entry document: always try the network, cache
    /// the fresh copy on success, fall back to the cache on failure. With no
    /// cached copy the original network error propagates.
    async fn online_first(&self, path: &str, url: &str) -> Result<CachedResponse, AgentError> {
        match self.fetcher.fetch(url, FetchMode::Default).await {
            Ok(fetched) => {
                let cached = fetched.into_cached();
                self.store.put(Namespace::Content, path, &cached)?;
                Ok(cached)
            }
            Err(err) => {
                warn!(error = %err, "entry document fetch failed; trying cache");
                if let Some(hit) = self.store.get(Namespace::Content, path)? {
                    return Ok(hit);
                }
                Err(err.into())
            }
        }
    }
}
