//! Bridges callback completion into awaitable requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{AuthError, AuthResult, AuthenticationListener, AuthenticationRequest};

/// Requests awaiting completion, keyed by a per-request id.
type InFlight = Arc<Mutex<HashMap<u64, Tracked>>>;

struct Tracked {
    cookie: String,
    token: CancellationToken,
}

/// Runs requests through a listener and tracks the ones in flight by
/// cookie.
#[derive(Clone)]
pub struct RequestDispatcher {
    listener: Arc<dyn AuthenticationListener>,
    in_flight: InFlight,
    next_id: Arc<AtomicU64>,
}

/// Removes its own entry when the request ends, including when the
/// awaiting future is dropped.
struct InFlightGuard {
    in_flight: InFlight,
    id: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}

impl RequestDispatcher {
    pub fn new(listener: Arc<dyn AuthenticationListener>) -> Self {
        Self {
            listener,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Run `request` to completion and return the listener's verdict.
    pub async fn begin(&self, request: AuthenticationRequest) -> AuthResult<()> {
        let token = CancellationToken::new();
        let guard = self.track(&request.cookie, token.clone());

        let (tx, rx) = oneshot::channel();
        self.listener.initiate(
            request,
            token,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );

        let result = rx.await;
        drop(guard);

        match result {
            Ok(result) => self.listener.finish(&result),
            Err(_) => Err(AuthError::Abandoned),
        }
    }

    fn track(&self, cookie: &str, token: CancellationToken) -> InFlightGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut in_flight = self.in_flight.lock();
        if in_flight.values().any(|tracked| tracked.cookie == cookie) {
            warn!(cookie, "Cookie reused while a request is in flight");
        }
        in_flight.insert(
            id,
            Tracked {
                cookie: cookie.to_string(),
                token,
            },
        );
        InFlightGuard {
            in_flight: self.in_flight.clone(),
            id,
        }
    }

    /// Mark every request with `cookie` cancelled. Returns false when no
    /// such request is in flight.
    ///
    /// The interaction is not interrupted; it still completes on its own.
    pub fn cancel(&self, cookie: &str) -> bool {
        let in_flight = self.in_flight.lock();
        let mut found = false;
        for tracked in in_flight.values().filter(|tracked| tracked.cookie == cookie) {
            tracked.token.cancel();
            found = true;
        }

        if found {
            info!(cookie, "Authority cancelled authentication request");
        } else {
            debug!(cookie, "Cancel for unknown request");
        }
        found
    }

    /// Number of requests awaiting completion.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthenticationResult, Completion, CompletionCallback, ListenerId};
    use polkit_identity::Identity;
    use tokio::runtime::Handle;

    /// Completes each request with a fixed outcome, or parks it until
    /// released.
    struct FakeListener {
        id: ListenerId,
        outcome: Option<Result<(), AuthError>>,
        parked: Mutex<Vec<(Completion, CancellationToken)>>,
    }

    impl FakeListener {
        fn completing(outcome: Result<(), AuthError>) -> Arc<Self> {
            Arc::new(Self {
                id: ListenerId::next(),
                outcome: Some(outcome),
                parked: Mutex::new(Vec::new()),
            })
        }

        fn parking() -> Arc<Self> {
            Arc::new(Self {
                id: ListenerId::next(),
                outcome: None,
                parked: Mutex::new(Vec::new()),
            })
        }
    }

    impl AuthenticationListener for FakeListener {
        fn id(&self) -> ListenerId {
            self.id
        }

        fn initiate(
            &self,
            request: AuthenticationRequest,
            cancellable: CancellationToken,
            on_complete: CompletionCallback,
        ) {
            let completion = Completion::new(Handle::current(), self.id, request.cookie, on_complete);
            match &self.outcome {
                Some(outcome) => completion.complete(outcome.clone()),
                None => self.parked.lock().push((completion, cancellable)),
            }
        }
    }

    fn request(cookie: &str) -> AuthenticationRequest {
        AuthenticationRequest::new("a", "m", cookie, vec![Identity::unix_user(1000)])
    }

    #[tokio::test]
    async fn begin_returns_listener_outcome() {
        let ok = RequestDispatcher::new(FakeListener::completing(Ok(())));
        assert_eq!(ok.begin(request("c1")).await, Ok(()));

        let cancelled = RequestDispatcher::new(FakeListener::completing(Err(AuthError::Cancelled)));
        assert_eq!(cancelled.begin(request("c2")).await, Err(AuthError::Cancelled));
        assert_eq!(cancelled.in_flight(), 0);
    }

    #[tokio::test]
    async fn cancel_marks_token_without_completing() {
        let listener = FakeListener::parking();
        let dispatcher = RequestDispatcher::new(listener.clone());

        let pending = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.begin(request("c1")).await }
        });
        while dispatcher.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(dispatcher.cancel("c1"));
        assert!(!dispatcher.cancel("unknown"));
        {
            let parked = listener.parked.lock();
            assert!(parked[0].1.is_cancelled());
        }
        assert!(!pending.is_finished());

        let (completion, _) = listener.parked.lock().remove(0);
        completion.complete(Ok(()));
        assert_eq!(pending.await.unwrap(), Ok(()));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn dropped_request_is_abandoned() {
        let listener = FakeListener::parking();
        let dispatcher = RequestDispatcher::new(listener.clone());

        let pending = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.begin(request("c1")).await }
        });
        while dispatcher.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        listener.parked.lock().clear();
        assert_eq!(pending.await.unwrap(), Err(AuthError::Abandoned));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn reused_cookie_keeps_later_request_cancellable() {
        let listener = FakeListener::parking();
        let dispatcher = RequestDispatcher::new(listener.clone());

        let first = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.begin(request("same")).await }
        });
        while dispatcher.in_flight() < 1 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.begin(request("same")).await }
        });
        while dispatcher.in_flight() < 2 {
            tokio::task::yield_now().await;
        }

        let (completion, _) = listener.parked.lock().remove(0);
        completion.complete(Ok(()));
        assert_eq!(first.await.unwrap(), Ok(()));
        assert_eq!(dispatcher.in_flight(), 1);

        assert!(dispatcher.cancel("same"));
        {
            let parked = listener.parked.lock();
            assert!(parked[0].1.is_cancelled());
        }

        let (completion, _) = listener.parked.lock().remove(0);
        completion.complete(Ok(()));
        assert_eq!(second.await.unwrap(), Ok(()));
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn aborted_begin_stops_tracking_request() {
        let listener = FakeListener::parking();
        let dispatcher = RequestDispatcher::new(listener.clone());

        let pending = tokio::spawn({
            let dispatcher = dispatcher.clone();
            async move { dispatcher.begin(request("c1")).await }
        });
        while dispatcher.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(dispatcher.in_flight(), 0);
        assert!(!dispatcher.cancel("c1"));

        listener.parked.lock().clear();
    }

    #[tokio::test]
    async fn foreign_result_outcome_is_reported() {
        struct Impostor(ListenerId);

        impl AuthenticationListener for Impostor {
            fn id(&self) -> ListenerId {
                self.0
            }

            fn initiate(
                &self,
                request: AuthenticationRequest,
                _cancellable: CancellationToken,
                on_complete: CompletionCallback,
            ) {
                on_complete(AuthenticationResult {
                    source: ListenerId::next(),
                    cookie: request.cookie,
                    outcome: Err(AuthError::NoIdentities),
                });
            }
        }

        let dispatcher = RequestDispatcher::new(Arc::new(Impostor(ListenerId::next())));
        assert_eq!(dispatcher.begin(request("c1")).await, Err(AuthError::NoIdentities));
    }
}
