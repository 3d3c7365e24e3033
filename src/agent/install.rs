//! Install handler.
//!
//! Populates the staging namespace with fresh copies of every shell set
//! path. Shell fetches bypass intermediate HTTP caches so a new agent
//! version never installs against a stale edge copy.

use super::SyncAgent;
use crate::error::AgentError;
use crate::fetch::FetchMode;
use crate::store::Namespace;
use tracing::{debug, info, warn};

impl SyncAgent {
    /// Fetch the shell set into staging, keyed by logical path.
    ///
    /// All-or-nothing: the first failed fetch fails the whole install, the
    /// partial staging state is discarded, and the host discards this agent
    /// version. Staging is only ever non-empty between a successful install
    /// and the end of the next activation.
    pub(super) async fn run_install(&self) -> Result<(), AgentError> {
        info!(
            shell = self.shell.len(),
            manifest = self.manifest.digest(),
            "installing: staging shell resources"
        );

        if let Err(err) = self.stage_shell().await {
            if let Err(clear_err) = self.store.clear(Namespace::Staging) {
                warn!(error = %clear_err, "failed to discard partial staging state");
            }
            return Err(err);
        }
        Ok(())
    }

    async fn stage_shell(&self) -> Result<(), AgentError> {
        for path in self.shell.iter() {
            let url = self.resource_url(path);
            let fetched = self.fetcher.fetch(&url, FetchMode::Reload).await?;
            debug!(path = path.as_str(), bytes = fetched.body.len(), "staged shell resource");
            self.store
                .put(Namespace::Staging, path, &fetched.into_cached())?;
        }
        Ok(())
    }
}
