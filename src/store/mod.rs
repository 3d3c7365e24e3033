//! Cache Store
//!
//! Persistent storage for cached resources, split into three named
//! namespaces: `Content` (the live resource cache), `Staging` (shell
//! downloads pending promotion), and the manifest history record. The agent
//! exclusively owns all three.

pub mod memory;
pub mod persistence;

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::MemoryCacheStore;
pub use persistence::SledCacheStore;

/// Response-entry namespaces. The manifest history record lives in its own
/// namespace behind the dedicated record methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Long-lived resource cache.
    Content,
    /// Transient holding area between install and the end of activate.
    Staging,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Content => "content",
            Namespace::Staging => "staging",
        }
    }
}

/// A cached response body plus the metadata needed to replay it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

/// Cache store interface
///
/// Entries are keyed by normalized logical path. Individual operations are
/// serialized by the backing store; callers must not assume atomicity across
/// multiple calls.
pub trait CacheStore: Send + Sync {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<CachedResponse>, StoreError>;
    fn put(&self, ns: Namespace, key: &str, response: &CachedResponse) -> Result<(), StoreError>;
    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError>;
    fn keys(&self, ns: Namespace) -> Result<Vec<String>, StoreError>;
    fn clear(&self, ns: Namespace) -> Result<(), StoreError>;

    /// Read the manifest active after the last successful activation, if any.
    fn load_manifest_record(&self) -> Result<Option<String>, StoreError>;
    /// Overwrite the single manifest history record.
    fn save_manifest_record(&self, json: &str) -> Result<(), StoreError>;
    fn clear_manifest_record(&self) -> Result<(), StoreError>;
}
