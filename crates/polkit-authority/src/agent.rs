//! The agent object exported on the bus.

use std::collections::HashMap;

use auth_session::{AuthError, AuthenticationRequest, RequestDispatcher};
use tracing::{info, warn};
use zbus::interface;

use crate::wire::{decode_identities, WireIdentity};

/// Errors returned to the authority.
#[derive(Debug, zbus::DBusError)]
#[zbus(prefix = "org.freedesktop.PolicyKit1.Error")]
pub enum AgentCallError {
    #[zbus(error)]
    ZBus(zbus::Error),
    Failed(String),
    Cancelled(String),
}

impl From<AuthError> for AgentCallError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Cancelled => Self::Cancelled(err.to_string()),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// `org.freedesktop.PolicyKit1.AuthenticationAgent`, backed by a
/// [`RequestDispatcher`].
pub struct AgentObject {
    dispatcher: RequestDispatcher,
}

impl AgentObject {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[interface(name = "org.freedesktop.PolicyKit1.AuthenticationAgent")]
impl AgentObject {
    /// Replies once the interaction has completed.
    async fn begin_authentication(
        &self,
        action_id: String,
        message: String,
        icon_name: String,
        details: HashMap<String, String>,
        cookie: String,
        identities: Vec<WireIdentity>,
    ) -> Result<(), AgentCallError> {
        let identities = decode_identities(&identities).map_err(|e| {
            warn!(cookie = %cookie, error = %e, "Rejecting request with malformed identities");
            AgentCallError::Failed(e.to_string())
        })?;

        info!(action_id = %action_id, cookie = %cookie, "BeginAuthentication");
        let request = AuthenticationRequest {
            action_id,
            message,
            icon_name,
            details,
            cookie,
            identities,
        };

        self.dispatcher.begin(request).await?;
        Ok(())
    }

    async fn cancel_authentication(&self, cookie: String) -> Result<(), AgentCallError> {
        if !self.dispatcher.cancel(&cookie) {
            return Err(AgentCallError::Failed(format!(
                "No such authentication request `{cookie}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_session::TerminalListener;
    use polkit_identity::{IdentityPresenter, StaticUserDirectory};
    use std::io::Cursor;
    use std::sync::Arc;
    use tokio::runtime::Handle;
    use tty_session::TerminalSession;
    use zbus::zvariant::{OwnedValue, Value};

    fn agent(terminal_input: &str) -> AgentObject {
        let (terminal, _) = TerminalSession::scripted(terminal_input);
        let presenter = IdentityPresenter::new(Arc::new(
            StaticUserDirectory::new().with_account(1000, "alice", ""),
        ));
        let listener = TerminalListener::with_response(
            terminal.into_shared(),
            presenter,
            Box::new(Cursor::new(b"\n".to_vec())),
            Handle::current(),
        );
        AgentObject::new(RequestDispatcher::new(Arc::new(listener)))
    }

    fn user(uid: u32) -> WireIdentity {
        let details = HashMap::from([(
            "uid".to_string(),
            OwnedValue::try_from(Value::U32(uid)).unwrap(),
        )]);
        ("unix-user".to_string(), details)
    }

    #[tokio::test]
    async fn begin_authentication_succeeds() {
        let agent = agent("");
        let result = agent
            .begin_authentication(
                "org.example.action".into(),
                "msg".into(),
                String::new(),
                HashMap::new(),
                "c1".into(),
                vec![user(1000)],
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn invalid_selection_maps_to_cancelled_error() {
        let agent = agent("abc\n");
        let result = agent
            .begin_authentication(
                "org.example.action".into(),
                "msg".into(),
                String::new(),
                HashMap::new(),
                "c1".into(),
                vec![user(1000), user(1001)],
            )
            .await;

        match result {
            Err(AgentCallError::Cancelled(message)) => {
                assert_eq!(message, "Authentication was canceled.")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_identity_fails_the_call() {
        let agent = agent("");
        let result = agent
            .begin_authentication(
                "a".into(),
                "m".into(),
                String::new(),
                HashMap::new(),
                "c1".into(),
                vec![("unix-user".to_string(), HashMap::new())],
            )
            .await;

        assert!(matches!(result, Err(AgentCallError::Failed(_))));
    }

    #[tokio::test]
    async fn cancel_unknown_cookie_fails() {
        let agent = agent("");
        assert!(matches!(
            agent.cancel_authentication("nope".into()).await,
            Err(AgentCallError::Failed(_))
        ));
    }

    #[test]
    fn auth_errors_map_to_polkit_errors() {
        assert!(matches!(
            AgentCallError::from(AuthError::Cancelled),
            AgentCallError::Cancelled(_)
        ));
        assert!(matches!(
            AgentCallError::from(AuthError::NoIdentities),
            AgentCallError::Failed(_)
        ));
    }
}
