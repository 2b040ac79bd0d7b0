//! Test harness for agent scenarios.
//!
//! Wires the same pieces `run_agent` does, minus the bus: a supervised
//! child, a [`TerminalListener`] over a scripted terminal and standard input,
//! and a [`RequestDispatcher`] standing in for the exported agent object.

use std::io::Cursor;
use std::sync::Arc;

use auth_session::{AuthResult, AuthenticationRequest, RequestDispatcher, TerminalListener};
use child_supervisor::ChildHandle;
use polkit_identity::{Identity, IdentityPresenter, StaticUserDirectory};
use tokio::runtime::Handle;
use tty_session::{TerminalSession, Transcript};

use crate::app::run_until_exit;
use crate::AgentResult;

pub const ACTION_ID: &str = "org.freedesktop.policykit.exec";
pub const MESSAGE: &str = "Authentication is needed to run `/usr/bin/id' as the super user";

/// One running agent with scripted input.
pub struct TestHarness {
    pub dispatcher: RequestDispatcher,
    pub transcript: Transcript,
    pub child: ChildHandle,
    next_cookie: u32,
}

impl TestHarness {
    /// Spawn `command` and set up a listener reading `terminal_input` from
    /// the terminal and `stdin` for the Return prompt.
    pub fn start(command: &[&str], terminal_input: &str, stdin: &str) -> Self {
        let argv: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        let child = child_supervisor::spawn(&argv).unwrap();

        let (terminal, transcript) = TerminalSession::scripted(terminal_input);
        let listener = TerminalListener::with_response(
            terminal.into_shared(),
            presenter(),
            Box::new(Cursor::new(stdin.as_bytes().to_vec())),
            Handle::current(),
        );

        Self {
            dispatcher: RequestDispatcher::new(Arc::new(listener)),
            transcript,
            child,
            next_cookie: 1,
        }
    }

    /// Deliver a challenge offering `identities` and await its completion.
    pub async fn authenticate(&mut self, identities: Vec<Identity>) -> AuthResult<()> {
        let cookie = format!("cookie-{}", self.next_cookie);
        self.next_cookie += 1;
        self.dispatcher
            .begin(AuthenticationRequest::new(ACTION_ID, MESSAGE, cookie, identities))
            .await
    }

    /// Run until the child exits and surface its status the way the agent
    /// does.
    pub async fn finish(mut self) -> AgentResult<()> {
        let status = run_until_exit(&mut self.child).await;
        status.check()?;
        Ok(())
    }
}

/// Directory with two users: `alice` (no GECOS) and `bob` (`Bob B.`).
pub fn presenter() -> IdentityPresenter {
    IdentityPresenter::new(Arc::new(
        StaticUserDirectory::new()
            .with_account(1000, "alice", "")
            .with_account(1001, "bob", "Bob B."),
    ))
}

pub fn alice() -> Identity {
    Identity::unix_user(1000)
}

pub fn bob() -> Identity {
    Identity::unix_user(1001)
}
