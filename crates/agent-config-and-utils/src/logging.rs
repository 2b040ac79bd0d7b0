//! Logging initialization for the agent.
//!
//! Thin wrapper over the observability crate. Events go to structured JSONL
//! at `~/.race-agent/logs/agent.jsonl` at the configured level. Stderr shares
//! the terminal with the authentication prompts, so it only gets warnings and
//! errors unless the log file cannot be opened.

use std::path::PathBuf;

/// Service name stamped on every JSONL line.
const SERVICE_NAME: &str = "race-agent";

/// Initialize the logging system for the agent.
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error); `RUST_LOG`
///   takes precedence.
/// * `log_path` - JSONL file to append to; `None` uses the observability
///   default location.
pub fn init_logging(level: &str, log_path: Option<PathBuf>) {
    let level = parse_level(level);
    observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: directive(level),
        log_path,
        also_stderr: true,
        stderr_level: Some(directive(stderr_level(level))),
    });
}

/// The configured level, capped at `WARN`.
fn stderr_level(level: tracing::Level) -> tracing::Level {
    level.min(tracing::Level::WARN)
}

fn directive(level: tracing::Level) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
