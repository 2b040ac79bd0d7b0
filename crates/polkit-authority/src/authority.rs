//! Connecting to the authority and registering the agent.

use std::collections::HashMap;
use std::sync::Arc;

use auth_session::{AuthenticationListener, RequestDispatcher};
use tracing::{debug, info, warn};
use zbus::zvariant::Value;
use zbus::Connection;

use crate::agent::AgentObject;
use crate::proxy::AuthorityProxy;
use crate::{AuthorityError, AuthorityResult, Subject};

/// How the agent registers itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Object path the agent object is exported at.
    pub object_path: String,
    /// Locale the authority should localize messages for.
    pub locale: String,
    /// Register as fallback agent: used only when no other agent matches.
    pub fallback: bool,
}

impl RegistrationOptions {
    fn to_wire(&self) -> HashMap<&'static str, Value<'static>> {
        let mut options = HashMap::new();
        if self.fallback {
            options.insert("fallback", Value::Bool(true));
        }
        options
    }
}

/// A connection to the polkit authority on the system bus.
#[derive(Debug, Clone)]
pub struct Authority {
    connection: Connection,
    proxy: AuthorityProxy<'static>,
}

impl Authority {
    /// Connect to the system bus and check the authority answers.
    pub async fn connect() -> AuthorityResult<Self> {
        let connection = Connection::system()
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;
        let proxy = AuthorityProxy::new(&connection)
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;

        let backend = proxy
            .backend_name()
            .await
            .map_err(|e| AuthorityError::Unavailable(e.to_string()))?;
        let version = proxy.backend_version().await.unwrap_or_default();
        info!(backend = %backend, version = %version, "Connected to polkit authority");

        Ok(Self { connection, proxy })
    }

    /// Export an agent object backed by `listener` and register it for
    /// `subject`.
    pub async fn register(
        &self,
        subject: Subject,
        listener: Arc<dyn AuthenticationListener>,
        options: &RegistrationOptions,
    ) -> AuthorityResult<AgentRegistration> {
        let dispatcher = RequestDispatcher::new(listener);
        let object_path = options.object_path.as_str();

        let exported = self
            .connection
            .object_server()
            .at(object_path, AgentObject::new(dispatcher.clone()))
            .await
            .map_err(|e| AuthorityError::Registration(e.to_string()))?;
        if !exported {
            return Err(AuthorityError::Registration(format!(
                "An object is already exported at {object_path}"
            )));
        }

        let registered = self
            .proxy
            .register_authentication_agent_with_options(
                &subject.to_wire(),
                &options.locale,
                object_path,
                options.to_wire(),
            )
            .await;
        if let Err(e) = registered {
            self.remove_object(object_path).await;
            return Err(AuthorityError::Registration(e.to_string()));
        }

        info!(
            object_path,
            locale = %options.locale,
            fallback = options.fallback,
            "Registered authentication agent"
        );
        Ok(AgentRegistration {
            authority: self.clone(),
            subject,
            object_path: options.object_path.clone(),
            dispatcher,
        })
    }

    async fn remove_object(&self, object_path: &str) {
        if let Err(e) = self
            .connection
            .object_server()
            .remove::<AgentObject, _>(object_path)
            .await
        {
            warn!(object_path, error = %e, "Failed to remove agent object");
        }
    }
}

/// A live agent registration. Call [`unregister`](Self::unregister) on
/// teardown.
#[derive(Debug)]
pub struct AgentRegistration {
    authority: Authority,
    subject: Subject,
    object_path: String,
    dispatcher: RequestDispatcher,
}

impl AgentRegistration {
    pub fn object_path(&self) -> &str {
        &self.object_path
    }

    /// Requests currently being handled.
    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    /// Unregister from the authority and stop serving the agent object.
    pub async fn unregister(self) -> AuthorityResult<()> {
        let result = self
            .authority
            .proxy
            .unregister_authentication_agent(&self.subject.to_wire(), &self.object_path)
            .await
            .map_err(|e| AuthorityError::Registration(e.to_string()));
        self.authority.remove_object(&self.object_path).await;

        debug!(object_path = %self.object_path, ok = result.is_ok(), "Unregistered authentication agent");
        result
    }
}
