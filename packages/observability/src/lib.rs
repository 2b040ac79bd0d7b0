//! # Observability
//!
//! Logging setup shared by the race-agent crates.
//!
//! Library crates only emit events through `tracing` macros. The binary
//! calls [`init_with_config`] once at startup to decide where they go:
//!
//! - a compact, human-oriented stderr layer
//! - with the `dev` feature (default), a JSONL file, by default
//!   `~/.race-agent/logs/agent.jsonl`, one [`LogEntry`] per line
//!
//! ```text
//! tail -f ~/.race-agent/logs/agent.jsonl | jq
//! ```
//!
//! `RUST_LOG` overrides the configured level for both layers.

#[cfg(feature = "dev")]
mod dev;

mod json_layer;

use std::path::PathBuf;

pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Stamped on every JSONL line as `service`.
    pub service_name: String,

    /// Filter directive used when `RUST_LOG` is unset, e.g. `info`.
    pub default_level: String,

    /// JSONL file; `None` uses `~/.race-agent/logs/agent.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also log to stderr. Forced on when the file cannot be opened.
    pub also_stderr: bool,

    /// Filter for the stderr layer while the file is open; `None` uses
    /// `default_level`. With no file, stderr always gets `default_level`.
    pub stderr_level: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            stderr_level: None,
        }
    }
}

/// Install the global subscriber.
///
/// Calling this more than once is harmless: the first subscriber wins and
/// later calls are ignored.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    {
        dev::init_dev_subscriber(&config);
    }

    #[cfg(not(feature = "dev"))]
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter(&config.default_level))
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
    }
}

/// `RUST_LOG` if set and valid, else `default_level`.
pub(crate) fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
        assert!(config.stderr_level.is_none());
    }

    #[test]
    fn repeated_init_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        for _ in 0..2 {
            init_with_config(LogConfig {
                service_name: "race-agent-test".into(),
                log_path: Some(dir.path().join("agent.jsonl")),
                also_stderr: true,
                stderr_level: Some("warn".into()),
                ..Default::default()
            });
        }
        tracing::info!("still logging");
    }
}
