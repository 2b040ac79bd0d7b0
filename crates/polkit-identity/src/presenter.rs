//! Human-readable identity labels.

use std::sync::Arc;

use tracing::warn;

use crate::{Identity, SystemUserDirectory, UserDirectory};

/// Turns identities into labels such as `Alice A. (alice)`.
#[derive(Clone)]
pub struct IdentityPresenter {
    directory: Arc<dyn UserDirectory>,
}

impl IdentityPresenter {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Presenter backed by the system passwd database.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemUserDirectory))
    }

    /// Label for `identity`. Never fails: a failed or empty lookup falls
    /// back to the generic string form.
    pub fn describe(&self, identity: &Identity) -> String {
        let Some(uid) = identity.uid() else {
            return identity.to_string();
        };

        match self.directory.lookup(uid) {
            Ok(Some(account)) => {
                if account.gecos.is_empty() || account.gecos == account.name {
                    account.name
                } else {
                    format!("{} ({})", account.gecos, account.name)
                }
            }
            Ok(None) => {
                warn!(uid, "No passwd entry for uid");
                identity.to_string()
            }
            Err(e) => {
                warn!(uid, error = %e, "User directory lookup failed");
                identity.to_string()
            }
        }
    }
}

impl Default for IdentityPresenter {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for IdentityPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityPresenter").finish_non_exhaustive()
    }
}
