//! Client side of `org.freedesktop.PolicyKit1.Authority`.

use std::collections::HashMap;

use zbus::proxy;
use zbus::zvariant::Value;

#[proxy(
    interface = "org.freedesktop.PolicyKit1.Authority",
    default_service = "org.freedesktop.PolicyKit1",
    default_path = "/org/freedesktop/PolicyKit1/Authority"
)]
pub trait Authority {
    fn register_authentication_agent_with_options(
        &self,
        subject: &(&str, HashMap<&str, Value<'_>>),
        locale: &str,
        object_path: &str,
        options: HashMap<&str, Value<'_>>,
    ) -> zbus::Result<()>;

    fn unregister_authentication_agent(
        &self,
        subject: &(&str, HashMap<&str, Value<'_>>),
        object_path: &str,
    ) -> zbus::Result<()>;

    #[zbus(property)]
    fn backend_name(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn backend_version(&self) -> zbus::Result<String>;
}
