//! Single-flight coordination of access-token refreshes
//!
//! The first request rejected with 401/403 while no refresh is running becomes
//! the leader and performs the refresh. Requests rejected while a refresh is in
//! flight are parked as [`Waiter`]s and released, in the order they arrived,
//! when the leader settles its [`RefreshLease`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::{ClientError, request::PendingRequest};

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
}

/// Tracks whether a refresh is in flight and who is waiting for it
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// Result of [`RefreshCoordinator::admit`]
pub enum Admission<'a> {
    /// No refresh was running; the caller must perform it
    Lead(RefreshLease<'a>, PendingRequest),
    /// A refresh is already running; await the ticket
    Wait(WaitTicket),
}

impl RefreshCoordinator {
    /// An idle coordinator with an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a request that was just rejected for an authorization reason.
    ///
    /// Checking and claiming the refresh happen under one lock, so two callers
    /// can never both become leader of the same episode.
    pub fn admit(&self, request: PendingRequest) -> Admission<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (reply, receiver) = oneshot::channel();
            state.waiters.push_back(Waiter { request, reply });
            debug!(queued = state.waiters.len(), "refresh in flight, request queued");
            Admission::Wait(WaitTicket { receiver })
        } else {
            state.refreshing = true;
            Admission::Lead(
                RefreshLease {
                    coordinator: self,
                    settled: false,
                },
                request,
            )
        }
    }

    /// Whether a refresh episode is currently running
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests parked behind the running refresh
    pub fn pending(&self) -> usize {
        self.lock().waiters.len()
    }

    fn finish(&self) -> Vec<Waiter> {
        let mut state = self.lock();
        state.refreshing = false;
        state.waiters.drain(..).collect()
    }
}

/// Proof that the holder is running the current refresh episode
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// End the episode: return to idle and hand back every waiter, oldest first
    pub fn settle(mut self) -> Vec<Waiter> {
        self.settled = true;
        self.coordinator.finish()
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let abandoned = self.coordinator.finish();
            if !abandoned.is_empty() {
                warn!(waiters = abandoned.len(), "refresh abandoned before completion");
            }
            for waiter in abandoned {
                waiter.reject("token refresh was cancelled");
            }
        }
    }
}

/// A request parked until the running refresh completes
pub struct Waiter {
    request: PendingRequest,
    reply: oneshot::Sender<Result<PendingRequest, ClientError>>,
}

impl Waiter {
    /// The parked request
    pub const fn request(&self) -> &PendingRequest {
        &self.request
    }

    /// Hand the request back to its caller carrying the new token
    pub fn resume(self, token: &str) {
        let mut request = self.request;
        request.reauthorize(token);
        // The caller may have given up; nothing to do then.
        let _ = self.reply.send(Ok(request));
    }

    /// Fail the caller without resubmitting
    pub fn reject(self, reason: &str) {
        let _ = self
            .reply
            .send(Err(ClientError::AuthenticationFailed(reason.to_string())));
    }
}

/// Resolves once the refresh this request is waiting on has completed
pub struct WaitTicket {
    receiver: oneshot::Receiver<Result<PendingRequest, ClientError>>,
}

impl Future for WaitTicket {
    type Output = Result<PendingRequest, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ClientError::AuthenticationFailed(
                    "token refresh ended without a result".to_string(),
                ))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestOptions;
    use reqwest::Method;

    fn get(path: &str) -> PendingRequest {
        PendingRequest::new(Method::GET, path, None, RequestOptions::new())
    }

    fn lead(admission: Admission<'_>) -> RefreshLease<'_> {
        match admission {
            Admission::Lead(lease, _) => lease,
            Admission::Wait(_) => panic!("expected to lead the refresh"),
        }
    }

    fn wait(admission: Admission<'_>) -> WaitTicket {
        match admission {
            Admission::Wait(ticket) => ticket,
            Admission::Lead(..) => panic!("expected to wait for the refresh"),
        }
    }

    #[test]
    fn first_rejection_leads_later_ones_wait() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(coordinator.admit(get("/a")));
        assert!(coordinator.is_refreshing());

        let _b = wait(coordinator.admit(get("/b")));
        let _c = wait(coordinator.admit(get("/c")));
        assert_eq!(coordinator.pending(), 2);

        let waiters = lease.settle();
        assert_eq!(waiters.len(), 2);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending(), 0);
    }

    #[test]
    fn waiters_drain_in_arrival_order() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(coordinator.admit(get("/first")));
        let _tickets: Vec<_> = ["/second", "/third", "/fourth"]
            .into_iter()
            .map(|path| wait(coordinator.admit(get(path))))
            .collect();

        let order: Vec<String> = lease
            .settle()
            .iter()
            .map(|waiter| waiter.request().path.clone())
            .collect();
        assert_eq!(order, ["/second", "/third", "/fourth"]);
    }

    #[test]
    fn new_episode_starts_after_settle() {
        let coordinator = RefreshCoordinator::new();
        lead(coordinator.admit(get("/a"))).settle();
        let lease = lead(coordinator.admit(get("/b")));
        assert!(lease.settle().is_empty());
    }

    #[tokio::test]
    async fn resumed_waiter_gets_token_and_retry_flag() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(coordinator.admit(get("/a")));
        let ticket = wait(coordinator.admit(get("/b")));

        for waiter in lease.settle() {
            waiter.resume("fresh-token");
        }

        let request = ticket.await.unwrap();
        assert_eq!(request.path, "/b");
        assert_eq!(request.bearer.as_deref(), Some("fresh-token"));
        assert!(request.retried);
    }

    #[tokio::test]
    async fn rejected_waiter_fails_with_auth_error() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(coordinator.admit(get("/a")));
        let ticket = wait(coordinator.admit(get("/b")));

        for waiter in lease.settle() {
            waiter.reject("refresh failed");
        }

        assert!(matches!(
            ticket.await,
            Err(ClientError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn dropped_lease_releases_waiters() {
        let coordinator = RefreshCoordinator::new();
        let lease = lead(coordinator.admit(get("/a")));
        let ticket = wait(coordinator.admit(get("/b")));

        drop(lease);

        assert!(!coordinator.is_refreshing());
        assert!(matches!(
            ticket.await,
            Err(ClientError::AuthenticationFailed(_))
        ));
    }
}
