//! User directory lookup keyed by uid.

use nix::unistd::{Uid, User};
use thiserror::Error;

/// The fields of a passwd entry the agent displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Login name.
    pub name: String,
    /// Descriptive (GECOS) field, usually the full name. May be empty.
    pub gecos: String,
}

impl Account {
    pub fn new(name: impl Into<String>, gecos: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gecos: gecos.into(),
        }
    }
}

/// Directory lookup failure.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The lookup call itself failed.
    #[error("Error calling getpwuid_r: {0}")]
    Lookup(#[from] nix::Error),
}

/// Source of account information.
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when no account has this uid.
    fn lookup(&self, uid: u32) -> Result<Option<Account>, DirectoryError>;
}

/// The system passwd database (`getpwuid_r`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUserDirectory;

impl UserDirectory for SystemUserDirectory {
    fn lookup(&self, uid: u32) -> Result<Option<Account>, DirectoryError> {
        let user = User::from_uid(Uid::from_raw(uid))?;
        Ok(user.map(|user| Account {
            gecos: user.gecos.to_string_lossy().into_owned(),
            name: user.name,
        }))
    }
}

/// A fixed uid → account table.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    accounts: std::collections::HashMap<u32, Account>,
}

#[cfg(any(test, feature = "testing"))]
impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, uid: u32, name: &str, gecos: &str) -> Self {
        self.accounts.insert(uid, Account::new(name, gecos));
        self
    }
}

#[cfg(any(test, feature = "testing"))]
impl UserDirectory for StaticUserDirectory {
    fn lookup(&self, uid: u32) -> Result<Option<Account>, DirectoryError> {
        Ok(self.accounts.get(&uid).cloned())
    }
}
