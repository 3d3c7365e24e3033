//! Resource Manifest
//!
//! Immutable mapping from logical resource path to content fingerprint,
//! generated by the build system and injected at agent construction. The
//! shell set is the ordered subset of manifest paths that must be staged
//! before an agent version can finish installing.

use crate::error::AgentError;
use crate::types::{Fingerprint, LogicalPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Reserved logical path for the entry document.
pub const ROOT_PATH: &str = "/";

/// Immutable path -> fingerprint mapping describing the desired cache state.
///
/// Iteration order is deterministic (BTreeMap), so serialization and the
/// manifest digest are stable for a given set of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest {
    resources: BTreeMap<LogicalPath, Fingerprint>,
}

impl ResourceManifest {
    pub fn new(resources: BTreeMap<LogicalPath, Fingerprint>) -> Self {
        Self { resources }
    }

    /// Build a manifest from (path, fingerprint) pairs.
    pub fn from_entries<P, F, I>(entries: I) -> Self
    where
        P: Into<LogicalPath>,
        F: Into<Fingerprint>,
        I: IntoIterator<Item = (P, F)>,
    {
        Self {
            resources: entries
                .into_iter()
                .map(|(p, f)| (p.into(), f.into()))
                .collect(),
        }
    }

    /// Parse a manifest from its JSON object serialization.
    pub fn from_json_str(json: &str) -> Result<Self, AgentError> {
        serde_json::from_str(json).map_err(|e| AgentError::ManifestParse(e.to_string()))
    }

    /// Load a generated manifest artifact from disk.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentError::ConfigError(format!(
                "failed to read manifest {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// JSON object serialization; this is the exact form persisted to the
    /// manifest history store.
    pub fn to_json(&self) -> Result<String, AgentError> {
        serde_json::to_string(self).map_err(|e| AgentError::ManifestParse(e.to_string()))
    }

    pub fn get(&self, path: &str) -> Option<&Fingerprint> {
        self.resources.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resources.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &LogicalPath> {
        self.resources.keys()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Short content digest identifying this manifest version in logs and
    /// status output. Observational only; the reconciler compares individual
    /// fingerprints, never digests.
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_vec(&self.resources).unwrap_or_default();
        let hash = blake3::hash(&canonical);
        hex::encode(&hash.as_bytes()[..8])
    }
}

/// Ordered list of paths that must be fetched fresh during installation.
///
/// A strict subset of the manifest's keys, validated at construction.
#[derive(Debug, Clone, Default)]
pub struct ShellSet {
    paths: Vec<LogicalPath>,
}

impl ShellSet {
    /// Validate that every shell path is a manifest key.
    pub fn new(paths: Vec<LogicalPath>, manifest: &ResourceManifest) -> Result<Self, AgentError> {
        for path in &paths {
            if !manifest.contains(path) {
                return Err(AgentError::ShellNotInManifest(path.clone()));
            }
        }
        Ok(Self { paths })
    }

    /// Load a generated shell set artifact (JSON array of paths) from disk.
    pub fn load(path: &Path, manifest: &ResourceManifest) -> Result<Self, AgentError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgentError::ConfigError(format!(
                "failed to read shell set {}: {}",
                path.display(),
                e
            ))
        })?;
        let paths: Vec<LogicalPath> = serde_json::from_str(&content)
            .map_err(|e| AgentError::ManifestParse(e.to_string()))?;
        Self::new(paths, manifest)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogicalPath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
