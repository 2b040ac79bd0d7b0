//! Decoding identities from their D-Bus form, `(sa{sv})`.

use std::collections::HashMap;

use polkit_identity::Identity;
use thiserror::Error;
use zbus::zvariant::{OwnedValue, Value};

/// An identity as received on the bus.
pub type WireIdentity = (String, HashMap<String, OwnedValue>);

/// A malformed identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("identity of kind `{kind}' lacks `{key}'")]
    MissingDetail { kind: String, key: &'static str },

    #[error("identity of kind `{kind}' has a malformed `{key}'")]
    MalformedDetail { kind: String, key: &'static str },
}

/// Decode one identity. Unknown kinds are kept as [`Identity::Other`].
pub fn decode_identity((kind, details): &WireIdentity) -> Result<Identity, WireError> {
    match kind.as_str() {
        "unix-user" => Ok(Identity::UnixUser {
            uid: id_detail(kind, details, "uid")?,
        }),
        "unix-group" => Ok(Identity::UnixGroup {
            gid: id_detail(kind, details, "gid")?,
        }),
        "unix-netgroup" => {
            let value = detail(kind, details, "name")?;
            match &**value {
                Value::Str(name) => Ok(Identity::UnixNetgroup {
                    name: name.as_str().to_string(),
                }),
                _ => Err(malformed(kind, "name")),
            }
        }
        _ => Ok(Identity::Other { kind: kind.clone() }),
    }
}

/// Decode a whole identity list, failing on the first malformed entry.
pub fn decode_identities(identities: &[WireIdentity]) -> Result<Vec<Identity>, WireError> {
    identities.iter().map(decode_identity).collect()
}

fn detail<'a>(
    kind: &str,
    details: &'a HashMap<String, OwnedValue>,
    key: &'static str,
) -> Result<&'a OwnedValue, WireError> {
    details.get(key).ok_or_else(|| WireError::MissingDetail {
        kind: kind.to_string(),
        key,
    })
}

/// Numeric ids are `u32` on the wire; some senders use `i32`.
fn id_detail(
    kind: &str,
    details: &HashMap<String, OwnedValue>,
    key: &'static str,
) -> Result<u32, WireError> {
    match &**detail(kind, details, key)? {
        Value::U32(id) => Ok(*id),
        Value::I32(id) => u32::try_from(*id).map_err(|_| malformed(kind, key)),
        _ => Err(malformed(kind, key)),
    }
}

fn malformed(kind: &str, key: &'static str) -> WireError {
    WireError::MalformedDetail {
        kind: kind.to_string(),
        key,
    }
}
