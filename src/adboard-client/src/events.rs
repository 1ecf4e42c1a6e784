//! Authentication events broadcast by the client.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

/// Event emitted when the client can no longer authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A token refresh failed; the session must be torn down.
    SessionExpired,
}

/// Broadcast channel for [`AuthEvent`]s.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn session_expired(&self) {
        match self.sender.send(AuthEvent::SessionExpired) {
            Ok(receivers) => {
                tracing::info!(receivers, "Broadcast session expired");
            }
            Err(_) => {
                tracing::debug!("Session expired with no subscribers");
            }
        }
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}
