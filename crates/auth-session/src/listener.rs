//! Authentication listeners.

use std::io::{self, BufRead, BufReader};
use std::sync::Arc;

use parking_lot::Mutex;
use polkit_identity::IdentityPresenter;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use tty_session::{SharedTerminal, TerminalError};

use crate::completion::{AuthenticationResult, Completion, CompletionCallback, ListenerId};
use crate::interaction::run_interaction;
use crate::{AuthError, AuthenticationRequest};

/// Shared line source for the "Press Return" response.
pub type ResponseSource = Arc<Mutex<Box<dyn BufRead + Send>>>;

/// Something that can authenticate a user for a request.
pub trait AuthenticationListener: Send + Sync {
    /// Id stamped on every result this listener produces.
    fn id(&self) -> ListenerId;

    /// Start handling `request`. Returns immediately; `on_complete` is
    /// scheduled on the event loop exactly once when the request ends.
    fn initiate(
        &self,
        request: AuthenticationRequest,
        cancellable: CancellationToken,
        on_complete: CompletionCallback,
    );

    /// Inspect a completed result. Answers the same every time.
    fn finish(&self, result: &AuthenticationResult) -> Result<(), AuthError> {
        if result.source != self.id() {
            warn!(
                cookie = %result.cookie,
                "Result was produced by a different listener"
            );
        }
        result.outcome.clone()
    }
}

/// Listener that interacts with the user over the controlling terminal.
pub struct TerminalListener {
    id: ListenerId,
    terminal: SharedTerminal,
    presenter: IdentityPresenter,
    response: ResponseSource,
    handle: Handle,
}

impl TerminalListener {
    /// Listener reading the "Press Return" response from standard input.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(terminal: SharedTerminal, presenter: IdentityPresenter) -> Self {
        Self::with_response(
            terminal,
            presenter,
            Box::new(BufReader::new(io::stdin())),
            Handle::current(),
        )
    }

    pub fn with_response(
        terminal: SharedTerminal,
        presenter: IdentityPresenter,
        response: Box<dyn BufRead + Send>,
        handle: Handle,
    ) -> Self {
        Self {
            id: ListenerId::next(),
            terminal,
            presenter,
            response: Arc::new(Mutex::new(response)),
            handle,
        }
    }
}

impl AuthenticationListener for TerminalListener {
    fn id(&self) -> ListenerId {
        self.id
    }

    fn initiate(
        &self,
        request: AuthenticationRequest,
        cancellable: CancellationToken,
        on_complete: CompletionCallback,
    ) {
        let completion = Completion::new(self.handle.clone(), self.id, &request.cookie, on_complete);
        let terminal = self.terminal.clone();
        let presenter = self.presenter.clone();
        let response = self.response.clone();

        debug!(
            action_id = %request.action_id,
            cookie = %request.cookie,
            identities = request.identities.len(),
            "Authentication requested"
        );

        self.handle.spawn_blocking(move || {
            // Held for the whole interaction: one request at a time.
            let mut terminal = terminal.lock();
            let mut response = response.lock();

            match run_interaction(&mut terminal, &presenter, &mut **response, &request) {
                Ok(outcome) => {
                    if cancellable.is_cancelled() {
                        debug!(cookie = %request.cookie, "Request was cancelled by the authority while in progress");
                    }
                    debug!(cookie = %request.cookie, state = ?outcome.state, "Interaction finished");
                    completion.complete(outcome.result);
                }
                Err(e) => abort_on_terminal_failure(&e),
            }
        });
    }
}

impl std::fmt::Debug for TerminalListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// End of input on the terminal mid-selection leaves no way to answer.
fn abort_on_terminal_failure(err: &TerminalError) -> ! {
    error!(error = %err, "Aborting on terminal failure");
    eprintln!("{err}");
    std::process::abort();
}
