//! Session state snapshot.

use std::fmt;

use adboard_client::User;
use serde::Serialize;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Startup check has not run yet.
    #[default]
    Uninitialized,
    /// A stored token is being verified.
    Checking,
    Anonymous,
    Authenticated,
    /// A token refresh failed. Nobody is logged in and the user still has to
    /// be told.
    Expired,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Checking => "checking",
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub user: Option<User>,
    pub status: SessionStatus,
    /// True until the startup check has finished.
    pub loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            status: SessionStatus::Uninitialized,
            loading: true,
        }
    }
}

impl SessionState {
    pub(crate) fn authenticated(user: User) -> Self {
        Self {
            user: Some(user),
            status: SessionStatus::Authenticated,
            loading: false,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            user: None,
            status: SessionStatus::Anonymous,
            loading: false,
        }
    }

    pub(crate) fn expired() -> Self {
        Self {
            user: None,
            status: SessionStatus::Expired,
            loading: false,
        }
    }

    /// Whether the session-expired notice should be shown.
    pub fn session_expired(&self) -> bool {
        self.status == SessionStatus::Expired
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
