//! Error types for the cache synchronization agent.
//!
//! Store and network failures are kept as separate enums so callers can
//! distinguish "the cache is unhealthy" from "the network is unreachable";
//! `AgentError` is the unified surface returned by agent operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the persistent cache stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open cache store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: sled::Error,
    },

    #[error("cache store backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("failed to encode cached record for {key}: {reason}")]
    Encode { key: String, reason: String },

    #[error("failed to decode cached record for {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("cache key is not valid UTF-8")]
    InvalidKey,
}

/// Errors raised while fetching a resource from the network.
///
/// `Status` covers HTTP-level failure (anything outside the 2xx range);
/// `Network` covers transport failure. A successful fetch never carries a
/// non-success status.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network unreachable for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },
}

/// Unified error surface for agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid lifecycle transition: {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("shell set entry {0} is not a manifest path")]
    ShellNotInManifest(String),

    #[error("failed to parse resource manifest: {0}")]
    ManifestParse(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
