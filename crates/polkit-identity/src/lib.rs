//! Polkit identities as seen by the authentication agent.
//!
//! This crate provides:
//! - The [`Identity`] model and its generic string form
//! - User directory lookup ([`UserDirectory`], [`SystemUserDirectory`])
//! - Human-readable labels ([`IdentityPresenter`])
//! - Interactive selection among several identities ([`choose`])

mod chooser;
mod directory;
mod identity;
mod presenter;

pub use chooser::{choose, parse_selection, InvalidSelection, Selection};
pub use directory::{Account, DirectoryError, SystemUserDirectory, UserDirectory};
#[cfg(any(test, feature = "testing"))]
pub use directory::StaticUserDirectory;
pub use identity::Identity;
pub use presenter::IdentityPresenter;
