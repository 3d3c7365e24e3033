//! Activation and reconciliation.
//!
//! Diffs the previously installed manifest against the manifest compiled
//! into this agent version and updates the content cache to match: entries
//! whose path and fingerprint are unchanged carry over untouched, everything
//! else is evicted, and the freshly staged shell resources are promoted on
//! top. The diff is keyed by path + fingerprint, so re-download cost is
//! bounded by the delta between deployments.

use super::SyncAgent;
use crate::error::AgentError;
use crate::manifest::ResourceManifest;
use crate::store::Namespace;
use tracing::{error, info, warn};

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Content entries carried over unchanged.
    pub retained: usize,
    /// Content entries removed (path gone or fingerprint changed).
    pub evicted: usize,
    /// Staging entries promoted into content.
    pub promoted: usize,
    /// True when no prior manifest record existed.
    pub cold_start: bool,
}

impl SyncAgent {
    /// Run the activation pass.
    ///
    /// Reconciliation failures are absorbed: the cache state is then
    /// unrecoverable, so all three namespaces are wiped and the agent
    /// continues with an empty cache. Only a failure of the wipe itself
    /// propagates.
    pub(super) async fn run_activate(&self) -> Result<(), AgentError> {
        match self.reconcile() {
            Ok(report) => {
                info!(
                    retained = report.retained,
                    evicted = report.evicted,
                    promoted = report.promoted,
                    cold_start = report.cold_start,
                    manifest = self.manifest.digest(),
                    "activation reconciled content cache"
                );
            }
            Err(err) => {
                error!(error = %err, "reconciliation failed; resetting to empty cache");
                self.wipe_all()?;
            }
        }

        // History is durable and staging is gone; safe to answer as the
        // controller from here on.
        info!("claiming clients");
        Ok(())
    }

    /// The manifest-diff reconciliation pass.
    ///
    /// Cold start is the degenerate warm upgrade: with no prior manifest
    /// every existing content entry fails the fingerprint comparison and is
    /// evicted before the merge, leaving exactly the staged shell.
    ///
    /// Ordering is load-bearing: eviction strictly precedes the staging
    /// merge (a surviving stale entry must not outlive a later eviction
    /// pass), and the merge precedes the history write.
    fn reconcile(&self) -> Result<ReconcileReport, AgentError> {
        let old = match self.store.load_manifest_record()? {
            Some(json) => ResourceManifest::from_json_str(&json)?,
            None => ResourceManifest::default(),
        };
        let cold_start = old.is_empty();

        let mut retained = 0;
        let mut evicted = 0;
        for key in self.store.keys(Namespace::Content)? {
            // Keys are normalized logical paths. An entry survives only if
            // the path is still in the manifest with an unchanged
            // fingerprint.
            let unchanged = match (self.manifest.get(&key), old.get(&key)) {
                (Some(new_fp), Some(old_fp)) => new_fp == old_fp,
                _ => false,
            };
            if unchanged {
                retained += 1;
            } else {
                self.store.delete(Namespace::Content, &key)?;
                evicted += 1;
            }
        }

        // Promote staged shell resources, overwriting any survivor: the
        // freshly fetched shell always wins.
        let mut promoted = 0;
        for key in self.store.keys(Namespace::Staging)? {
            if let Some(response) = self.store.get(Namespace::Staging, &key)? {
                self.store.put(Namespace::Content, &key, &response)?;
                promoted += 1;
            }
        }
        self.store.clear(Namespace::Staging)?;

        self.store.save_manifest_record(&self.manifest.to_json()?)?;

        Ok(ReconcileReport {
            retained,
            evicted,
            promoted,
            cold_start,
        })
    }

    /// Fail-safe reset: delete all three namespaces, leaving the agent with
    /// no cache at all. Subsequent requests fall through to the network.
    fn wipe_all(&self) -> Result<(), AgentError> {
        warn!("wiping content, staging, and manifest history");
        self.store.clear(Namespace::Content)?;
        self.store.clear(Namespace::Staging)?;
        self.store.clear_manifest_record()?;
        Ok(())
    }
}
