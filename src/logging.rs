//! Logging System
//!
//! Structured logging with the `tracing` crate: configurable level, text or
//! JSON output, stdout or stderr destination. Environment variables take
//! precedence over the configuration file.

use crate::error::AgentError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr (default: stderr)
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order (highest to lowest): `HARBOR_LOG` / `HARBOR_LOG_FORMAT`
/// environment variables, the provided configuration, defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), AgentError> {
    let cfg = config.cloned().unwrap_or_default();
    if !cfg.enabled {
        return Ok(());
    }

    let level = std::env::var("HARBOR_LOG")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| cfg.level.clone());
    let format = std::env::var("HARBOR_LOG_FORMAT")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| cfg.format.clone());

    let filter = EnvFilter::try_new(&level)
        .map_err(|e| AgentError::ConfigError(format!("invalid log level {level}: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(cfg.color);

    let result = match (format.as_str(), cfg.output.as_str()) {
        ("json", "stdout") => builder.json().try_init(),
        ("json", _) => builder.json().with_writer(std::io::stderr).try_init(),
        (_, "stdout") => builder.try_init(),
        _ => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| AgentError::ConfigError(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = LoggingConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.format, "text");
        assert_eq!(cfg.output, "stderr");
    }

    #[test]
    fn disabled_logging_is_a_no_op() {
        let cfg = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging(Some(&cfg)).is_ok());
    }
}
