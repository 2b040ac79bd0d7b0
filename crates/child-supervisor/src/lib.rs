//! The supervised command.
//!
//! [`spawn`] starts the command with the agent's environment and stdio and
//! hands reaping to an exit watcher task. The watcher publishes the final
//! [`ChildStatus`] on a watch channel; [`ChildHandle::wait_for_exit`] is the
//! stop flag the run loop waits on.

mod error;

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub use error::{SupervisorError, SupervisorResult};

/// Lifecycle of the supervised command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildStatus {
    Running,
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by this signal.
    Signaled(i32),
    /// Waiting failed; the status cannot be known.
    Lost(String),
}

impl ChildStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ChildStatus::Running)
    }

    /// `Ok` for a clean exit. Errors carry the message shown to the user.
    pub fn check(&self) -> SupervisorResult<()> {
        match self {
            ChildStatus::Running | ChildStatus::Exited(0) => Ok(()),
            ChildStatus::Exited(code) => Err(SupervisorError::ChildFailed(format!(
                "Child process exited with code {code}"
            ))),
            ChildStatus::Signaled(signal) => Err(SupervisorError::ChildFailed(format!(
                "Child process killed by signal {signal}"
            ))),
            ChildStatus::Lost(reason) => Err(SupervisorError::Wait(reason.clone())),
        }
    }
}

impl From<ExitStatus> for ChildStatus {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ChildStatus::Exited(code),
            (None, Some(signal)) => ChildStatus::Signaled(signal),
            (None, None) => ChildStatus::Lost(format!("unrecognized wait status {status}")),
        }
    }
}

/// A running command, observed through its exit watcher.
#[derive(Debug)]
pub struct ChildHandle {
    pid: u32,
    status: watch::Receiver<ChildStatus>,
}

impl ChildHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Latest known status.
    pub fn status(&self) -> ChildStatus {
        self.status.borrow().clone()
    }

    /// Resolve once the child is no longer running.
    pub async fn wait_for_exit(&mut self) -> ChildStatus {
        if let Ok(status) = self.status.wait_for(|status| !status.is_running()).await {
            return status.clone();
        }
        // The watcher always publishes before dropping its sender.
        self.status.borrow().clone()
    }
}

/// Start `argv[0]` with the remaining arguments, searching `PATH`.
///
/// The child inherits environment and stdio. Must be called from within a
/// tokio runtime; the exit watcher runs as a task on it.
pub fn spawn(argv: &[String]) -> SupervisorResult<ChildHandle> {
    let (program, args) = argv.split_first().ok_or(SupervisorError::EmptyCommand)?;

    let child = Command::new(program)
        .args(args)
        .spawn()
        .map_err(|source| SupervisorError::SpawnFailed {
            program: program.clone(),
            source,
        })?;
    let pid = child.id().unwrap_or_default();
    info!(pid, program = %program, "Spawned child process");

    let (tx, rx) = watch::channel(ChildStatus::Running);
    tokio::spawn(watch_exit(child, pid, tx));

    Ok(ChildHandle { pid, status: rx })
}

/// Exit watcher: the only place the child is reaped.
async fn watch_exit(mut child: Child, pid: u32, tx: watch::Sender<ChildStatus>) {
    let status = match child.wait().await {
        Ok(status) => ChildStatus::from(status),
        Err(e) => {
            error!(pid, error = %e, "Error waiting for child process");
            ChildStatus::Lost(e.to_string())
        }
    };

    match &status {
        ChildStatus::Exited(0) => info!(pid, "Child process exited"),
        other => warn!(pid, status = ?other, "Child process ended abnormally"),
    }
    tx.send_replace(status);
}
