//! One authentication request, end to end.
//!
//! A request arrives from the authority, is presented on the controlling
//! terminal, and completes exactly once with success or an [`AuthError`]:
//!
//! - [`request_fsm`] tracks where a request is
//! - [`run_interaction`] drives the terminal side
//! - [`Completion`] guarantees the once-only asynchronous callback
//! - [`TerminalListener`] ties them together behind [`AuthenticationListener`]
//! - [`RequestDispatcher`] turns a callback completion into an awaitable call

mod completion;
mod dispatch;
mod error;
mod interaction;
mod listener;
mod request;
pub mod request_fsm;

pub use completion::{AuthenticationResult, Completion, CompletionCallback, ListenerId};
pub use dispatch::RequestDispatcher;
pub use error::{AuthError, AuthResult};
pub use interaction::{run_interaction, Outcome};
pub use listener::{AuthenticationListener, ResponseSource, TerminalListener};
pub use request::AuthenticationRequest;
pub use request_fsm::RequestState;
