//! Polkit authority client over the system bus.
//!
//! Connects to `org.freedesktop.PolicyKit1`, exports the
//! `AuthenticationAgent` object and registers it for a `unix-process`
//! subject.

mod agent;
mod authority;
mod error;
mod proxy;
mod subject;
mod wire;

pub use agent::{AgentCallError, AgentObject};
pub use authority::{AgentRegistration, Authority, RegistrationOptions};
pub use error::{AuthorityError, AuthorityResult};
pub use proxy::AuthorityProxy;
pub use subject::{Subject, WireSubject};
pub use wire::{decode_identities, decode_identity, WireError, WireIdentity};
