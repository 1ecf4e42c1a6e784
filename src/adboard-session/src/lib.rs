//! Session lifecycle for the adboard client.
//!
//! [`SessionManager`] owns the user-facing session state: who is logged in,
//! whether the startup check is still running, and whether the session was
//! torn down by a failed token refresh. State changes are published on a
//! `tokio::sync::watch` channel.

mod manager;
mod state;

pub use manager::SessionManager;
pub use state::{SessionState, SessionStatus};
