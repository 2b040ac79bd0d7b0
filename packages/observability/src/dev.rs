//! Dev-mode subscriber: JSONL file plus compact stderr.
//!
//! The file is opened in append mode, so several agents can share it and
//! `tail -f` sees whole lines.

use crate::json_layer::JsonLayer;
use crate::{env_filter, LogConfig};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Default log file location: `~/.race-agent/logs/agent.jsonl`.
fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".race-agent").join("logs").join("agent.jsonl"))
}

/// Handle to the shared JSONL file. Clones share one descriptor; each
/// line is written under the lock with a single `write_all`.
#[derive(Clone)]
pub struct CentralLogWriter {
    file: Arc<Mutex<File>>,
}

impl CentralLogWriter {
    /// Open `path` for appending, creating it and its parents.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl Write for CentralLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.lock().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for CentralLogWriter {
    type Writer = CentralLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize the dev subscriber with central JSONL file output.
///
/// An unwritable log file degrades to stderr-only logging instead of
/// failing startup.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().or_else(default_log_path);

    let (writer, open_error) = match log_path.as_deref().map(CentralLogWriter::new) {
        Some(Ok(writer)) => (Some(writer), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let json_layer = writer.map(|writer| {
        JsonLayer::new(config.service_name.clone(), writer)
            .with_filter(env_filter(&config.default_level))
    });

    // Always keep stderr when the file sink is missing, otherwise
    // warnings would vanish.
    let stderr_level = match (&json_layer, &config.stderr_level) {
        (Some(_), Some(level)) => level.as_str(),
        _ => config.default_level.as_str(),
    };
    let stderr_layer = if config.also_stderr || json_layer.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_filter(env_filter(stderr_level)),
        )
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }

    match (&log_path, open_error) {
        (Some(path), None) => {
            tracing::debug!(log_path = %path.display(), "observability initialized");
        }
        (Some(path), Some(e)) => {
            tracing::warn!(
                log_path = %path.display(),
                error = %e,
                "Could not open log file, logging to stderr only"
            );
        }
        (None, _) => {
            tracing::debug!("No home directory, logging to stderr only");
        }
    }
}
