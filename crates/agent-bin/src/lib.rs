//! race-agent: a stub polkit authentication agent.
//!
//! Runs one command as a child process and, for as long as it runs, answers
//! polkit authentication requests for this process on the controlling
//! terminal. No credentials are checked: the user picks an identity, presses
//! Return and the request succeeds.
//!
//! ```text
//! spawn child -> register agent -> serve requests -> child exits -> unregister
//! ```

pub mod app;
pub mod error;

#[cfg(test)]
mod tests;

pub use app::{run_agent, run_until_exit, AgentOptions};
pub use error::{AgentError, AgentResult};
