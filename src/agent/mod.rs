//! Cache Synchronization Agent
//!
//! The lifecycle state machine spanning installation, activation, and
//! steady-state request interception. Each external trigger (install,
//! activate, fetch, control message) is a typed event consumed against the
//! current state; the host runtime guarantees install completes before
//! activate begins, and activate completes before the agent answers fetches
//! as the controller.

mod activate;
mod control;
mod install;
mod interceptor;

pub use control::ControlMessage;
pub use interceptor::InterceptOutcome;

use crate::error::AgentError;
use crate::fetch::ResourceFetcher;
use crate::manifest::{ResourceManifest, ShellSet, ROOT_PATH};
use crate::store::CacheStore;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Lifecycle states of an agent version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninstalled,
    Installing,
    Installed,
    Activating,
    Active,
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninstalled => "uninstalled",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Failed => "failed",
        }
    }
}

/// External lifecycle triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Install,
    Activate,
    /// Activation requested through the control channel, skipping the normal
    /// wait for existing clients.
    ForceActivate,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::ForceActivate => "force-activate",
        }
    }
}

/// The cache synchronization agent.
///
/// Owns the three cache namespaces exclusively. The manifest and shell set
/// are immutable for the lifetime of the agent version; a new deployment
/// ships a new agent with a new manifest.
pub struct SyncAgent {
    manifest: ResourceManifest,
    shell: ShellSet,
    origin: String,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn ResourceFetcher>,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
}

impl SyncAgent {
    pub fn new(
        manifest: ResourceManifest,
        shell: ShellSet,
        origin: impl Into<String>,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn ResourceFetcher>,
    ) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self {
            manifest,
            shell,
            origin,
            store,
            fetcher,
            state: RwLock::new(LifecycleState::Uninstalled),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether this version asked the host to skip the wait-for-idle-clients
    /// delay. Set during install so an upgrade is never blocked by open tabs.
    pub fn waiting_skipped(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.write();
        debug!(from = state.as_str(), to = next.as_str(), "lifecycle transition");
        *state = next;
    }

    /// Consume one lifecycle event against the current state.
    ///
    /// Invalid (state, event) pairs are rejected without a state change. An
    /// install failure moves to `Failed` (the host discards this version);
    /// activation absorbs reconciliation failures internally and only fails
    /// here if the fail-safe wipe itself cannot complete.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<(), AgentError> {
        let state = self.state();
        match (state, event) {
            (LifecycleState::Uninstalled | LifecycleState::Failed, LifecycleEvent::Install) => {
                self.set_state(LifecycleState::Installing);
                self.skip_waiting.store(true, Ordering::SeqCst);
                match self.run_install().await {
                    Ok(()) => {
                        self.set_state(LifecycleState::Installed);
                        Ok(())
                    }
                    Err(err) => {
                        self.set_state(LifecycleState::Failed);
                        Err(err)
                    }
                }
            }
            (
                LifecycleState::Installed,
                LifecycleEvent::Activate | LifecycleEvent::ForceActivate,
            ) => {
                self.set_state(LifecycleState::Activating);
                match self.run_activate().await {
                    Ok(()) => {
                        self.set_state(LifecycleState::Active);
                        Ok(())
                    }
                    Err(err) => {
                        self.set_state(LifecycleState::Failed);
                        Err(err)
                    }
                }
            }
            _ => Err(AgentError::InvalidTransition {
                state: state.as_str(),
                event: event.as_str(),
            }),
        }
    }

    /// Absolute URL for a logical path on this agent's origin.
    pub(crate) fn resource_url(&self, path: &str) -> String {
        if path == ROOT_PATH {
            format!("{}/", self.origin)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{FetchMode, FetchedResponse};
    use crate::store::MemoryCacheStore;
    use async_trait::async_trait;

    struct NoFetcher;

    #[async_trait]
    impl ResourceFetcher for NoFetcher {
        async fn fetch(&self, url: &str, _mode: FetchMode) -> Result<FetchedResponse, FetchError> {
            Err(FetchError::Network {
                url: url.to_string(),
                reason: "unreachable in test".to_string(),
            })
        }
    }

    fn agent() -> SyncAgent {
        let manifest = ResourceManifest::from_entries([("a.js", "h1")]);
        let shell = ShellSet::new(vec![], &manifest).unwrap();
        SyncAgent::new(
            manifest,
            shell,
            "https://app.example.test",
            Arc::new(MemoryCacheStore::new()),
            Arc::new(NoFetcher),
        )
    }

    #[tokio::test]
    async fn activate_before_install_is_rejected() {
        let agent = agent();
        let err = agent.dispatch(LifecycleEvent::Activate).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidTransition {
                state: "uninstalled",
                event: "activate"
            }
        ));
        assert_eq!(agent.state(), LifecycleState::Uninstalled);
    }

    #[tokio::test]
    async fn install_sets_skip_waiting() {
        let agent = agent();
        assert!(!agent.waiting_skipped());
        agent.dispatch(LifecycleEvent::Install).await.unwrap();
        assert!(agent.waiting_skipped());
        assert_eq!(agent.state(), LifecycleState::Installed);
    }

    #[test]
    fn resource_url_handles_root() {
        let agent = agent();
        assert_eq!(agent.resource_url("/"), "https://app.example.test/");
        assert_eq!(agent.resource_url("a.js"), "https://app.example.test/a.js");
    }
}
