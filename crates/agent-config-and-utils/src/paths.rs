//! File system paths for the agent.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Name of the per-user runtime directory under `$HOME`.
const BASE_DIR_NAME: &str = ".race-agent";
/// Structured log filename under the logs directory.
const LOG_FILE_NAME: &str = "agent.jsonl";

/// Manages file system paths for the agent.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for agent files (~/.race-agent)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.race-agent`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.race-agent).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.race-agent/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the logs directory (~/.race-agent/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured log file path (~/.race-agent/logs/agent.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }
}
