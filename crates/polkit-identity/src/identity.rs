//! The identity a user can authenticate as.

use std::fmt;

/// An identity offered by the authority for one authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// A unix user account.
    UnixUser { uid: u32 },
    /// Any member of a unix group.
    UnixGroup { gid: u32 },
    /// Any member of a netgroup.
    UnixNetgroup { name: String },
    /// A kind this agent does not know how to present.
    Other { kind: String },
}

impl Identity {
    /// Shorthand for a unix user identity.
    pub fn unix_user(uid: u32) -> Self {
        Self::UnixUser { uid }
    }

    /// The uid, for unix user identities.
    pub fn uid(&self) -> Option<u32> {
        match self {
            Self::UnixUser { uid } => Some(*uid),
            _ => None,
        }
    }

    /// The polkit kind tag (`unix-user`, `unix-group`, ...).
    pub fn kind(&self) -> &str {
        match self {
            Self::UnixUser { .. } => "unix-user",
            Self::UnixGroup { .. } => "unix-group",
            Self::UnixNetgroup { .. } => "unix-netgroup",
            Self::Other { kind } => kind,
        }
    }
}

/// The authority's generic string form, e.g. `unix-user:1000`.
impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnixUser { uid } => write!(f, "unix-user:{uid}"),
            Self::UnixGroup { gid } => write!(f, "unix-group:{gid}"),
            Self::UnixNetgroup { name } => write!(f, "unix-netgroup:{name}"),
            Self::Other { kind } => f.write_str(kind),
        }
    }
}
