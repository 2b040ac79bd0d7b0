//! The `unix-process` subject the agent registers for.

use std::collections::HashMap;
use std::fs;

use nix::unistd::getuid;
use tracing::debug;
use zbus::zvariant::Value;

use crate::{AuthorityError, AuthorityResult};

/// Wire form of a polkit subject: kind plus details, `(sa{sv})`.
pub type WireSubject = (&'static str, HashMap<&'static str, Value<'static>>);

/// A process, identified by pid and start time so a recycled pid never
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub pid: u32,
    /// Start time in clock ticks since boot (`/proc/<pid>/stat` field 22).
    pub start_time: u64,
    pub uid: u32,
}

impl Subject {
    /// The current process, owned by the real uid.
    pub fn for_current_process() -> AuthorityResult<Self> {
        let pid = std::process::id();
        let subject = Self {
            pid,
            start_time: process_start_time(pid)?,
            uid: getuid().as_raw(),
        };
        debug!(pid, start_time = subject.start_time, uid = subject.uid, "Resolved subject");
        Ok(subject)
    }

    pub fn to_wire(&self) -> WireSubject {
        let details = HashMap::from([
            ("pid", Value::U32(self.pid)),
            ("start-time", Value::U64(self.start_time)),
            // unix-process carries the uid as int32.
            ("uid", Value::I32(self.uid as i32)),
        ]);
        ("unix-process", details)
    }
}

fn process_start_time(pid: u32) -> AuthorityResult<u64> {
    let path = format!("/proc/{pid}/stat");
    let stat = fs::read_to_string(&path)
        .map_err(|e| AuthorityError::Subject(format!("Error reading {path}: {e}")))?;
    parse_start_time(&stat)
        .ok_or_else(|| AuthorityError::Subject(format!("Malformed {path}")))
}

/// Extract the start time from the contents of a `stat` file.
///
/// The command name may contain spaces and parentheses, so fields are
/// counted from the last `)`.
fn parse_start_time(stat: &str) -> Option<u64> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.split_whitespace().nth(19)?.parse().ok()
}
