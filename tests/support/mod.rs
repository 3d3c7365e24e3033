//! Shared test support: scripted fetcher and agent construction helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use harbor::agent::{LifecycleEvent, SyncAgent};
use harbor::error::FetchError;
use harbor::fetch::{FetchMode, FetchedResponse, ResourceFetcher};
use harbor::manifest::{ResourceManifest, ShellSet};
use harbor::store::{CacheStore, MemoryCacheStore, Namespace};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const ORIGIN: &str = "https://app.example.test";

pub fn url(path: &str) -> String {
    if path == "/" {
        format!("{ORIGIN}/")
    } else {
        format!("{ORIGIN}/{path}")
    }
}

/// Scripted network double: responses keyed by URL, with failure injection
/// and a fetch log for counting and mode assertions.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
    log: Mutex<Vec<(String, FetchMode)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, body: &[u8]) {
        self.responses.lock().insert(url.into(), body.to_vec());
    }

    pub fn remove(&self, url: &str) {
        self.responses.lock().remove(url);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.log.lock().iter().filter(|(u, _)| u == url).count()
    }

    pub fn reload_count(&self, url: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|(u, mode)| u == url && *mode == FetchMode::Reload)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.log.lock().len()
    }
}

#[async_trait]
impl ResourceFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchedResponse, FetchError> {
        self.log.lock().push((url.to_string(), mode));

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network {
                url: url.to_string(),
                reason: "scripted offline".to_string(),
            });
        }

        match self.responses.lock().get(url) {
            Some(body) => Ok(FetchedResponse {
                status: 200,
                content_type: Some("application/octet-stream".to_string()),
                body: body.clone(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Build an agent over the given store and fetcher from literal manifest
/// entries and shell paths.
pub fn agent_with(
    entries: &[(&str, &str)],
    shell: &[&str],
    store: Arc<dyn CacheStore>,
    fetcher: Arc<ScriptedFetcher>,
) -> SyncAgent {
    let manifest = ResourceManifest::from_entries(entries.iter().map(|(p, f)| (*p, *f)));
    let shell = ShellSet::new(shell.iter().map(|p| p.to_string()).collect(), &manifest).unwrap();
    SyncAgent::new(manifest, shell, ORIGIN, store, fetcher)
}

pub fn memory_store() -> Arc<MemoryCacheStore> {
    Arc::new(MemoryCacheStore::new())
}

/// Drive one full install + activate cycle.
pub async fn run_cycle(agent: &SyncAgent) {
    agent.dispatch(LifecycleEvent::Install).await.unwrap();
    agent.dispatch(LifecycleEvent::Activate).await.unwrap();
}

pub fn content_keys(store: &dyn CacheStore) -> Vec<String> {
    let mut keys = store.keys(Namespace::Content).unwrap();
    keys.sort();
    keys
}

pub fn content_body(store: &dyn CacheStore, path: &str) -> Option<Vec<u8>> {
    store
        .get(Namespace::Content, path)
        .unwrap()
        .map(|response| response.body)
}

pub fn staging_keys(store: &dyn CacheStore) -> Vec<String> {
    store.keys(Namespace::Staging).unwrap()
}
