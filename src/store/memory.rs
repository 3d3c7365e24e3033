//! In-memory cache store.
//!
//! Same contract as the sled store without persistence. Used by tests and
//! benchmarks that exercise the reconciliation protocol against synthetic
//! manifests.

use super::{CacheStore, CachedResponse, Namespace};
use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Inner {
    content: BTreeMap<String, CachedResponse>,
    staging: BTreeMap<String, CachedResponse>,
    manifest: Option<String>,
}

#[derive(Default)]
pub struct MemoryCacheStore {
    inner: RwLock<Inner>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn map(&self, ns: Namespace) -> &BTreeMap<String, CachedResponse> {
        match ns {
            Namespace::Content => &self.content,
            Namespace::Staging => &self.staging,
        }
    }

    fn map_mut(&mut self, ns: Namespace) -> &mut BTreeMap<String, CachedResponse> {
        match ns {
            Namespace::Content => &mut self.content,
            Namespace::Staging => &mut self.staging,
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<CachedResponse>, StoreError> {
        Ok(self.inner.read().map(ns).get(key).cloned())
    }

    fn put(&self, ns: Namespace, key: &str, response: &CachedResponse) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_mut(ns)
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        self.inner.write().map_mut(ns).remove(key);
        Ok(())
    }

    fn keys(&self, ns: Namespace) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.read().map(ns).keys().cloned().collect())
    }

    fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
        self.inner.write().map_mut(ns).clear();
        Ok(())
    }

    fn load_manifest_record(&self) -> Result<Option<String>, StoreError> {
        Ok(self.inner.read().manifest.clone())
    }

    fn save_manifest_record(&self, json: &str) -> Result<(), StoreError> {
        self.inner.write().manifest = Some(json.to_string());
        Ok(())
    }

    fn clear_manifest_record(&self) -> Result<(), StoreError> {
        self.inner.write().manifest = None;
        Ok(())
    }
}
