//! The synchronous terminal interaction for one request.
//!
//! Runs with the terminal lock held, on a blocking worker thread.

use std::io::BufRead;

use polkit_identity::{choose, Identity, IdentityPresenter, Selection};
use tracing::{debug, info, warn};
use tty_session::{TerminalError, TerminalResult, TerminalSession};

use crate::request_fsm::{RequestInput, RequestMachine, RequestState};
use crate::{AuthError, AuthenticationRequest};

/// How an interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Final machine state.
    pub state: RequestState,
    /// Identity the user authenticated as, once resolved.
    pub identity: Option<Identity>,
    /// What the request completes with.
    pub result: Result<(), AuthError>,
}

/// Drive `request` to an outcome.
///
/// Terminal write failures end the request with [`AuthError::Terminal`].
/// End of input on the terminal is returned as
/// [`TerminalError::UnexpectedEndOfInput`] for the caller to treat as fatal.
/// `response` is read once before success; errors and end of input there
/// are logged and ignored.
pub fn run_interaction(
    terminal: &mut TerminalSession,
    presenter: &IdentityPresenter,
    response: &mut dyn BufRead,
    request: &AuthenticationRequest,
) -> TerminalResult<Outcome> {
    let mut interaction = Interaction {
        machine: RequestMachine::new(),
        terminal,
        presenter,
        identity: None,
    };

    match interaction.drive(response, request) {
        Ok(result) => Ok(Outcome {
            state: *interaction.machine.state(),
            identity: interaction.identity,
            result,
        }),
        Err(TerminalError::UnexpectedEndOfInput) => {
            interaction.advance(RequestInput::TerminalFailed);
            Err(TerminalError::UnexpectedEndOfInput)
        }
        Err(e) => {
            warn!(cookie = %request.cookie, error = %e, "Terminal failed during authentication");
            interaction.advance(RequestInput::TerminalFailed);
            Ok(Outcome {
                state: *interaction.machine.state(),
                identity: interaction.identity,
                result: Err(AuthError::Terminal(e.to_string())),
            })
        }
    }
}

struct Interaction<'a> {
    machine: RequestMachine,
    terminal: &'a mut TerminalSession,
    presenter: &'a IdentityPresenter,
    identity: Option<Identity>,
}

impl Interaction<'_> {
    fn advance(&mut self, input: RequestInput) {
        if self.machine.consume(&input).is_err() {
            warn!(?input, state = ?self.machine.state(), "Ignoring impossible request transition");
        }
    }

    fn drive(
        &mut self,
        response: &mut dyn BufRead,
        request: &AuthenticationRequest,
    ) -> TerminalResult<Result<(), AuthError>> {
        self.terminal
            .banner(&format!("(not really) AUTHENTICATING: {} ", request.action_id))?;
        self.terminal.write_line(&request.message)?;

        match self.resolve_identity(&request.identities)? {
            Some(identity) => {
                debug!(cookie = %request.cookie, identity = %identity, "Identity resolved");
                self.identity = Some(identity.clone());
            }
            None if request.identities.is_empty() => {
                warn!(cookie = %request.cookie, "Authority offered no identities");
                return Ok(Err(AuthError::NoIdentities));
            }
            None => {
                self.terminal.banner("==== AUTHENTICATION CANCELED ===")?;
                info!(cookie = %request.cookie, "Authentication cancelled by invalid selection");
                return Ok(Err(AuthError::Cancelled));
            }
        }

        self.terminal.write_line(&format!("COOKIE: {}", request.cookie))?;
        self.terminal
            .write_line("Press Return to see if you won the authentication race!")?;
        read_response(response);
        self.advance(RequestInput::ResponseCollected);

        Ok(Ok(()))
    }

    /// `None` for an empty list or an invalid selection.
    fn resolve_identity<'i>(
        &mut self,
        identities: &'i [Identity],
    ) -> TerminalResult<Option<&'i Identity>> {
        match identities {
            [] => {
                self.advance(RequestInput::NoIdentitiesOffered);
                Ok(None)
            }
            [only] => {
                self.advance(RequestInput::OneIdentityOffered);
                self.terminal.write_line(&format!(
                    "Authenticating as: {}",
                    self.presenter.describe(only)
                ))?;
                self.advance(RequestInput::IdentityAnnounced);
                Ok(Some(only))
            }
            several => {
                self.advance(RequestInput::SeveralIdentitiesOffered);
                match choose(self.terminal, self.presenter, several)? {
                    Selection::Chosen(identity) => {
                        self.advance(RequestInput::IdentityChosen);
                        Ok(Some(identity))
                    }
                    Selection::Cancelled => {
                        self.advance(RequestInput::SelectionInvalid);
                        Ok(None)
                    }
                }
            }
        }
    }
}

fn read_response(response: &mut dyn BufRead) {
    let mut line = String::new();
    match response.read_line(&mut line) {
        Ok(0) => debug!("End of standard input while waiting for Return"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to read from standard input"),
    }
}
