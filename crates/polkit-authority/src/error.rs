//! Error types for the authority client.

use thiserror::Error;

/// Authority client error type.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The authority could not be reached.
    #[error("Error getting authority: {0}")]
    Unavailable(String),

    /// The authority refused or failed the agent registration.
    #[error("Error registering authentication agent: {0}")]
    Registration(String),

    /// The process subject could not be identified.
    #[error("Error identifying subject: {0}")]
    Subject(String),
}

/// Result type for authority operations.
pub type AuthorityResult<T> = Result<T, AuthorityError>;
