//! Exactly-once asynchronous completion of a request.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::AuthError;

/// Identifies the listener that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// A process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The stored outcome of one request, handed to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Listener that ran the request.
    pub source: ListenerId,
    /// Cookie of the request.
    pub cookie: String,
    /// Success or the error the request ended with.
    pub outcome: Result<(), AuthError>,
}

/// Callback receiving the result; runs on the event loop.
pub type CompletionCallback = Box<dyn FnOnce(AuthenticationResult) + Send + 'static>;

/// Pending completion of one request.
///
/// [`complete`](Self::complete) consumes the value, so a request completes
/// at most once. Dropping it without completing reports
/// [`AuthError::Abandoned`], so it also completes at least once.
pub struct Completion {
    handle: Handle,
    source: ListenerId,
    cookie: String,
    callback: Option<CompletionCallback>,
}

impl Completion {
    pub fn new(
        handle: Handle,
        source: ListenerId,
        cookie: impl Into<String>,
        callback: CompletionCallback,
    ) -> Self {
        Self {
            handle,
            source,
            cookie: cookie.into(),
            callback: Some(callback),
        }
    }

    /// Schedule the callback with `outcome`. Never runs it in-line.
    pub fn complete(mut self, outcome: Result<(), AuthError>) {
        self.fire(outcome);
    }

    fn fire(&mut self, outcome: Result<(), AuthError>) {
        let Some(callback) = self.callback.take() else {
            return;
        };

        let result = AuthenticationResult {
            source: self.source,
            cookie: std::mem::take(&mut self.cookie),
            outcome,
        };
        debug!(cookie = %result.cookie, ok = result.outcome.is_ok(), "Scheduling completion");
        self.handle.spawn(async move { callback(result) });
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.callback.is_some() {
            warn!(cookie = %self.cookie, "Request dropped before completion");
            self.fire(Err(AuthError::Abandoned));
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("source", &self.source)
            .field("cookie", &self.cookie)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}
