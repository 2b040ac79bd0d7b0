//! Top-level error type.

use agent_config_and_utils::CoreError;
use child_supervisor::SupervisorError;
use polkit_authority::AuthorityError;
use thiserror::Error;
use tty_session::TerminalError;

/// Any failure that ends the agent. `Display` is the message printed on
/// stderr before exiting with status 1.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error(transparent)]
    Authority(#[from] AuthorityError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type for the agent.
pub type AgentResult<T> = Result<T, AgentError>;
