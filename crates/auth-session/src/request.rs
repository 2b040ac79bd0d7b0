//! The authentication challenge delivered by the authority.

use std::collections::HashMap;

use polkit_identity::Identity;

/// One authentication challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// Action being authorized, e.g. `org.freedesktop.systemd1.manage-units`.
    pub action_id: String,
    /// Message to show the user.
    pub message: String,
    /// Icon hint; unused by a terminal agent.
    pub icon_name: String,
    /// Extra key/value details about the action.
    pub details: HashMap<String, String>,
    /// Opaque cookie identifying the request to the authority.
    pub cookie: String,
    /// Candidate identities, in display order.
    pub identities: Vec<Identity>,
}

impl AuthenticationRequest {
    pub fn new(
        action_id: impl Into<String>,
        message: impl Into<String>,
        cookie: impl Into<String>,
        identities: Vec<Identity>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            message: message.into(),
            icon_name: String::new(),
            details: HashMap::new(),
            cookie: cookie.into(),
            identities,
        }
    }
}
