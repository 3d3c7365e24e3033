//! Sled-backed cache store.
//!
//! Three named trees inside one sled database: `content`, `staging`, and
//! `manifest-history`. Records are bincode-serialized [`CachedResponse`]
//! values; the manifest history tree holds one JSON string under a fixed key.

use super::{CacheStore, CachedResponse, Namespace};
use crate::error::StoreError;
use std::path::Path;

const CONTENT_TREE: &str = "content";
const STAGING_TREE: &str = "staging";
const HISTORY_TREE: &str = "manifest-history";

/// Fixed key for the single manifest history record.
const MANIFEST_KEY: &str = "manifest";

pub struct SledCacheStore {
    db: sled::Db,
    content: sled::Tree,
    staging: sled::Tree,
    history: sled::Tree,
}

impl SledCacheStore {
    /// Open (or create) the store at `path`.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_db(db)
    }

    /// Wrap an already-open sled database.
    pub fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let content = db.open_tree(CONTENT_TREE)?;
        let staging = db.open_tree(STAGING_TREE)?;
        let history = db.open_tree(HISTORY_TREE)?;
        Ok(Self {
            db,
            content,
            staging,
            history,
        })
    }

    fn tree(&self, ns: Namespace) -> &sled::Tree {
        match ns {
            Namespace::Content => &self.content,
            Namespace::Staging => &self.staging,
        }
    }
}

impl CacheStore for SledCacheStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<CachedResponse>, StoreError> {
        match self.tree(ns).get(key.as_bytes())? {
            Some(raw) => {
                let response =
                    bincode::deserialize(&raw).map_err(|e| StoreError::Decode {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(response))
            }
            None => Ok(None),
        }
    }

    fn put(&self, ns: Namespace, key: &str, response: &CachedResponse) -> Result<(), StoreError> {
        let raw = bincode::serialize(response).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.tree(ns).insert(key.as_bytes(), raw)?;
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        self.tree(ns).remove(key.as_bytes())?;
        Ok(())
    }

    fn keys(&self, ns: Namespace) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in self.tree(ns).iter() {
            let (key, _) = entry?;
            let key = std::str::from_utf8(&key).map_err(|_| StoreError::InvalidKey)?;
            keys.push(key.to_string());
        }
        Ok(keys)
    }

    fn clear(&self, ns: Namespace) -> Result<(), StoreError> {
        self.tree(ns).clear()?;
        Ok(())
    }

    fn load_manifest_record(&self) -> Result<Option<String>, StoreError> {
        match self.history.get(MANIFEST_KEY)? {
            Some(raw) => {
                let json = std::str::from_utf8(&raw)
                    .map_err(|_| StoreError::Decode {
                        key: MANIFEST_KEY.to_string(),
                        reason: "record is not valid UTF-8".to_string(),
                    })?
                    .to_string();
                Ok(Some(json))
            }
            None => Ok(None),
        }
    }

    fn save_manifest_record(&self, json: &str) -> Result<(), StoreError> {
        self.history.insert(MANIFEST_KEY, json.as_bytes())?;
        // Activation endpoint; make the new record durable before the agent
        // starts answering as the controller.
        self.db.flush()?;
        Ok(())
    }

    fn clear_manifest_record(&self) -> Result<(), StoreError> {
        self.history.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn response(body: &[u8]) -> CachedResponse {
        CachedResponse {
            status: 200,
            content_type: Some("application/javascript".to_string()),
            body: body.to_vec(),
            stored_at: Utc::now(),
        }
    }

    #[test]
    fn put_get_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SledCacheStore::new(dir.path()).unwrap();

        store
            .put(Namespace::Content, "main.js", &response(b"console.log(1)"))
            .unwrap();
        let hit = store.get(Namespace::Content, "main.js").unwrap().unwrap();
        assert_eq!(hit.body, b"console.log(1)");

        store.delete(Namespace::Content, "main.js").unwrap();
        assert!(store.get(Namespace::Content, "main.js").unwrap().is_none());
    }

    #[test]
    fn namespaces_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = SledCacheStore::new(dir.path()).unwrap();

        store
            .put(Namespace::Staging, "main.js", &response(b"staged"))
            .unwrap();
        assert!(store.get(Namespace::Content, "main.js").unwrap().is_none());
        assert_eq!(store.keys(Namespace::Staging).unwrap(), vec!["main.js"]);

        store.clear(Namespace::Staging).unwrap();
        assert!(store.keys(Namespace::Staging).unwrap().is_empty());
    }

    #[test]
    fn manifest_record_holds_at_most_one_value() {
        let dir = TempDir::new().unwrap();
        let store = SledCacheStore::new(dir.path()).unwrap();

        assert!(store.load_manifest_record().unwrap().is_none());
        store.save_manifest_record(r#"{"a.js":"h1"}"#).unwrap();
        store.save_manifest_record(r#"{"a.js":"h2"}"#).unwrap();
        assert_eq!(
            store.load_manifest_record().unwrap().as_deref(),
            Some(r#"{"a.js":"h2"}"#)
        );

        store.clear_manifest_record().unwrap();
        assert!(store.load_manifest_record().unwrap().is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = SledCacheStore::new(dir.path()).unwrap();
            store
                .put(Namespace::Content, "a.js", &response(b"persisted"))
                .unwrap();
            store.save_manifest_record("{}").unwrap();
        }
        let store = SledCacheStore::new(dir.path()).unwrap();
        let hit = store.get(Namespace::Content, "a.js").unwrap().unwrap();
        assert_eq!(hit.body, b"persisted");
        assert_eq!(store.load_manifest_record().unwrap().as_deref(), Some("{}"));
    }
}
