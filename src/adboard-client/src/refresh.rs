//! Single-flight coordination of token refreshes.
//!
//! The first request rejected with 401 becomes the leader and performs the
//! refresh. Requests rejected while it runs are parked with a oneshot
//! responder; the leader drains them when it settles.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::client::REFRESH_PATH;
use crate::error::{ApiError, Result};
use crate::request::ApiRequest;

/// A request waiting for the in-flight refresh to settle.
pub(crate) struct PendingRequest<T> {
    pub(crate) request: ApiRequest,
    pub(crate) responder: oneshot::Sender<Result<T>>,
}

impl<T> PendingRequest<T> {
    /// Complete the parked caller. A caller that stopped waiting is ignored.
    pub(crate) fn respond(self, outcome: Result<T>) {
        if self.responder.send(outcome).is_err() {
            tracing::debug!(path = self.request.path(), "Queued request was abandoned");
        }
    }
}

struct RefreshState<T> {
    in_flight: bool,
    pending: Vec<PendingRequest<T>>,
}

/// Outcome of joining the refresh protocol after a 401.
pub(crate) enum RefreshTicket<T> {
    /// This caller must perform the refresh, then replay its own request.
    Leader(RefreshLease<T>, ApiRequest),
    /// A refresh is already running; the replay result arrives here.
    Queued(oneshot::Receiver<Result<T>>),
}

pub(crate) struct RefreshCoordinator<T> {
    state: Arc<Mutex<RefreshState<T>>>,
}

impl<T> RefreshCoordinator<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RefreshState {
                in_flight: false,
                pending: Vec::new(),
            })),
        }
    }

    /// Become the refresh leader, or park `request` behind the current one.
    ///
    /// The leader gets its request back; only followers are queued.
    pub(crate) fn join(&self, request: ApiRequest) -> RefreshTicket<T> {
        let mut state = self.state.lock();
        if state.in_flight {
            let (responder, receiver) = oneshot::channel();
            tracing::debug!(
                path = request.path(),
                queued = state.pending.len() + 1,
                "Refresh in flight, queueing request"
            );
            state.pending.push(PendingRequest { request, responder });
            RefreshTicket::Queued(receiver)
        } else {
            state.in_flight = true;
            let lease = RefreshLease {
                state: Arc::clone(&self.state),
                settled: false,
            };
            RefreshTicket::Leader(lease, request)
        }
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.state.lock().in_flight
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }
}

/// Held by the refresh leader until the refresh settles.
///
/// Dropping an unsettled lease (for example when the leader's future is
/// cancelled) clears the flag and rejects everything queued behind it.
pub(crate) struct RefreshLease<T> {
    state: Arc<Mutex<RefreshState<T>>>,
    settled: bool,
}

impl<T> RefreshLease<T> {
    /// Clear the in-flight flag and take the queue in one critical section.
    pub(crate) fn settle(mut self) -> Vec<PendingRequest<T>> {
        self.settled = true;
        take_pending(&self.state)
    }
}

impl<T> Drop for RefreshLease<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let pending = take_pending(&self.state);
        if !pending.is_empty() {
            tracing::warn!(
                queued = pending.len(),
                "Token refresh abandoned, rejecting queued requests"
            );
        }
        for entry in pending {
            entry.respond(Err(cancelled()));
        }
    }
}

fn take_pending<T>(state: &Mutex<RefreshState<T>>) -> Vec<PendingRequest<T>> {
    let mut state = state.lock();
    state.in_flight = false;
    std::mem::take(&mut state.pending)
}

/// Error delivered to a queued request whose refresh never settled.
pub(crate) fn cancelled() -> ApiError {
    ApiError::Network {
        endpoint: REFRESH_PATH.to_string(),
        message: "token refresh was cancelled".to_string(),
    }
}
