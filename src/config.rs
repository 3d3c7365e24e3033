//! Agent configuration.
//!
//! Layered loading with precedence: `HARBOR_*` environment variables, then
//! the configuration file, then defaults. The manifest and shell set paths
//! point at the artifacts the build system generates alongside the deployed
//! resources.

use crate::error::AgentError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Origin the agent governs, e.g. "https://app.example.com".
    pub origin: String,

    /// Path to the generated resource manifest (JSON object).
    pub manifest_path: PathBuf,

    /// Path to the generated shell set (JSON array of manifest paths).
    pub shell_path: PathBuf,

    /// Directory holding the cache store; None means the platform default.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AgentConfig {
    /// Load configuration from an optional file plus environment overrides.
    pub fn load(file: Option<&Path>) -> Result<Self, AgentError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("HARBOR").separator("__"));

        let config = builder
            .build()
            .map_err(|e| AgentError::ConfigError(format!("failed to load configuration: {e}")))?;
        config
            .try_deserialize()
            .map_err(|e| AgentError::ConfigError(format!("invalid configuration: {e}")))
    }

    /// Resolve the cache store directory, falling back to the platform data
    /// directory.
    pub fn store_path(&self) -> Result<PathBuf, AgentError> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let project_dirs = directories::ProjectDirs::from("", "harbor", "harbor").ok_or_else(
            || {
                AgentError::ConfigError(
                    "could not determine platform data directory for the cache store".to_string(),
                )
            },
        )?;
        Ok(project_dirs.data_dir().join("cache"))
    }
}
