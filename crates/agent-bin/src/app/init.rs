//! Agent initialization.

use std::sync::Arc;

use agent_config_and_utils::Config;
use auth_session::{AuthenticationListener, TerminalListener};
use polkit_authority::{Authority, RegistrationOptions, Subject};
use polkit_identity::IdentityPresenter;
use tracing::{info, warn};
use tty_session::TerminalSession;

use crate::app::run_until_exit;
use crate::AgentResult;

/// Everything the agent needs to run, resolved from config and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Command to supervise, program first.
    pub command: Vec<String>,
    pub registration: RegistrationOptions,
    /// Color banners on the terminal.
    pub highlight: bool,
}

impl AgentOptions {
    pub fn from_config(config: &Config, command: Vec<String>) -> Self {
        Self {
            command,
            registration: RegistrationOptions {
                object_path: config.object_path.clone(),
                locale: config.locale(),
                fallback: config.fallback,
            },
            highlight: config.highlight,
        }
    }
}

/// Run the agent until the supervised command exits.
///
/// Order matters: the child is spawned first, so setup failures after that
/// leave it running on its own.
pub async fn run_agent(options: AgentOptions) -> AgentResult<()> {
    info!(command = ?options.command, "Starting race-agent");

    let mut child = child_supervisor::spawn(&options.command)?;

    let subject = Subject::for_current_process()?;
    let authority = Authority::connect().await?;

    // Fails without a controlling terminal.
    let terminal = TerminalSession::open()?
        .with_highlight(options.highlight)
        .into_shared();
    let listener: Arc<dyn AuthenticationListener> =
        Arc::new(TerminalListener::new(terminal, IdentityPresenter::system()));

    let registration = authority
        .register(subject, listener, &options.registration)
        .await?;
    info!(pid = child.pid(), object_path = registration.object_path(), "Agent ready");

    let status = run_until_exit(&mut child).await;

    if registration.in_flight() > 0 {
        warn!(in_flight = registration.in_flight(), "Exiting with requests in flight");
    }
    if let Err(e) = registration.unregister().await {
        warn!(error = %e, "Failed to unregister authentication agent");
    }

    status.check()?;
    Ok(())
}
