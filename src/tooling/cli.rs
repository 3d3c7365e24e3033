//! CLI Tooling
//!
//! Command-line interface for agent operations: run an install + activate
//! cycle, prefetch the full manifest for offline use, and inspect cache
//! state against the manifest.

use crate::agent::{LifecycleEvent, SyncAgent};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::fetch::HttpFetcher;
use crate::manifest::{ResourceManifest, ShellSet};
use crate::store::{CacheStore, Namespace, SledCacheStore};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Harbor CLI - manifest-driven offline cache synchronization
#[derive(Parser)]
#[command(name = "harbor")]
#[command(about = "Manifest-driven offline resource cache synchronization")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one install + activate cycle against the configured origin
    Sync,
    /// Fetch every manifest resource missing from the content cache
    Prefetch,
    /// Show cached state for every manifest path
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

pub struct CliContext {
    config: AgentConfig,
}

impl CliContext {
    pub fn new(config_file: Option<PathBuf>) -> Result<Self, AgentError> {
        let config = AgentConfig::load(config_file.as_deref())?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn build_agent(&self) -> Result<SyncAgent, AgentError> {
        let manifest = ResourceManifest::load(&self.config.manifest_path)?;
        let shell = ShellSet::load(&self.config.shell_path, &manifest)?;
        let store = SledCacheStore::new(&self.config.store_path()?)?;
        Ok(SyncAgent::new(
            manifest,
            shell,
            self.config.origin.clone(),
            Arc::new(store),
            Arc::new(HttpFetcher::new()),
        ))
    }

    /// Execute a command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, AgentError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AgentError::Runtime(format!("failed to start async runtime: {e}")))?;

        match command {
            Commands::Sync => runtime.block_on(self.sync()),
            Commands::Prefetch => runtime.block_on(self.prefetch()),
            Commands::Status { format } => self.status(format),
        }
    }

    async fn sync(&self) -> Result<String, AgentError> {
        let agent = self.build_agent()?;
        agent.dispatch(LifecycleEvent::Install).await?;
        agent.dispatch(LifecycleEvent::Activate).await?;
        Ok(format!(
            "synchronized manifest {} ({} resources)",
            agent.manifest().digest(),
            agent.manifest().len()
        ))
    }

    async fn prefetch(&self) -> Result<String, AgentError> {
        let agent = self.build_agent()?;
        agent.prefetch_all().await?;
        Ok("prefetch complete; every manifest resource is cached".to_string())
    }

    fn status(&self, format: &str) -> Result<String, AgentError> {
        let manifest = ResourceManifest::load(&self.config.manifest_path)?;
        let store = SledCacheStore::new(&self.config.store_path()?)?;
        let cached: HashSet<String> = store.keys(Namespace::Content)?.into_iter().collect();

        let mut rows: Vec<(String, String, &'static str)> = Vec::new();
        for path in manifest.paths() {
            let state = if cached.contains(path) { "cached" } else { "missing" };
            let fingerprint = manifest.get(path).cloned().unwrap_or_default();
            rows.push((path.clone(), fingerprint, state));
        }
        for key in &cached {
            if !manifest.contains(key) {
                rows.push((key.clone(), String::new(), "stale"));
            }
        }

        if format == "json" {
            let resources: Vec<_> = rows
                .iter()
                .map(|(path, fingerprint, state)| {
                    json!({ "path": path, "fingerprint": fingerprint, "state": state })
                })
                .collect();
            return Ok(json!({
                "manifest_digest": manifest.digest(),
                "resources": resources,
            })
            .to_string());
        }

        let mut table = Table::new();
        table.set_header(vec!["Path", "Fingerprint", "State"]);
        for (path, fingerprint, state) in rows {
            let state = match state {
                "cached" => state.green().to_string(),
                "missing" => state.yellow().to_string(),
                _ => state.red().to_string(),
            };
            table.add_row(vec![path, fingerprint, state]);
        }
        Ok(format!("manifest {}\n{}", manifest.digest(), table))
    }
}
