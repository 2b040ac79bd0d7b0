//! Application wiring and run loop.

mod init;
mod run_loop;

pub use init::{run_agent, AgentOptions};
pub use run_loop::run_until_exit;
