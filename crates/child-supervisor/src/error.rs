//! Error types for the child supervisor.

use thiserror::Error;

/// Child supervisor error type.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// No command was given.
    #[error("No command to run")]
    EmptyCommand,

    /// The command could not be started.
    #[error("Failed to execute child process \u{201c}{program}\u{201d} ({source})")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but did not exit successfully.
    #[error("{0}")]
    ChildFailed(String),

    /// Waiting on the child failed; its status is unknown.
    #[error("Failed to wait for child process: {0}")]
    Wait(String),
}

/// Result type for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
