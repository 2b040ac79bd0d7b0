//! Error types for authentication requests.

use thiserror::Error;

/// Why an authentication request did not succeed.
///
/// `Clone` so a stored result can be inspected any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The user gave an invalid identity selection.
    #[error("Authentication was canceled.")]
    Cancelled,

    /// The authority offered no identity to authenticate as.
    #[error("No identities to authenticate as")]
    NoIdentities,

    /// Writing to the terminal failed mid-interaction.
    #[error("Terminal failure: {0}")]
    Terminal(String),

    /// The request was dropped before it completed.
    #[error("Authentication request was abandoned")]
    Abandoned,
}

/// Result type for authentication requests.
pub type AuthResult<T> = Result<T, AuthError>;
