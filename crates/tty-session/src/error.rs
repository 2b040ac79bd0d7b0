//! Error types for the terminal session.

use thiserror::Error;

/// Terminal session error type.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// No controlling terminal, or it could not be opened.
    #[error("{0}")]
    Unavailable(String),

    /// The terminal reached end of input before a line terminator.
    #[error("Got unexpected EOF while reading from controlling terminal.")]
    UnexpectedEndOfInput,

    /// Read or write failure on an open terminal.
    #[error("Terminal IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;
