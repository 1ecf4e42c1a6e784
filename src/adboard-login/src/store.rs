//! Credential store abstraction.

use anyhow::Result;
use secrecy::SecretString;

use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Persistent key/value storage for credentials.
///
/// Implementations must be safe to share between the HTTP client, its cookie
/// provider and the session layer.
pub trait CredentialStore: Send + Sync {
    /// Load the value stored under `key`.
    fn load(&self, key: &str) -> Result<Option<SecretString>>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: SecretString) -> Result<()>;

    /// Remove `key`. Returns true if a value was present.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Current access token, if any.
    ///
    /// Read failures are logged and treated as "no token".
    fn access_token(&self) -> Option<SecretString> {
        match self.load(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored access token");
                None
            }
        }
    }

    /// Whether an access token is stored.
    fn has_access_token(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist a new access token.
    fn set_access_token(&self, token: SecretString) -> Result<()> {
        self.save(ACCESS_TOKEN_KEY, token)
    }

    /// Remove the access token.
    fn clear_access_token(&self) -> Result<bool> {
        self.delete(ACCESS_TOKEN_KEY)
    }

    /// Current refresh credential, if any.
    fn refresh_token(&self) -> Option<SecretString> {
        match self.load(REFRESH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored refresh credential");
                None
            }
        }
    }
}

/// Remove every session credential (access token and refresh credential).
///
/// Best effort: failures are logged, and the return value tells whether
/// anything was removed.
pub fn clear_session_credentials(store: &dyn CredentialStore) -> bool {
    let mut deleted = false;
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
        match store.delete(key) {
            Ok(true) => {
                tracing::debug!(key, "Deleted stored credential");
                deleted = true;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to delete stored credential");
            }
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCredentialStore;
    use secrecy::ExposeSecret;

    #[test]
    fn test_access_token_helpers() {
        let store = MemoryCredentialStore::new();
        assert!(!store.has_access_token());

        store
            .set_access_token(SecretString::from("T1".to_string()))
            .unwrap();
        assert_eq!(store.access_token().unwrap().expose_secret(), "T1");

        assert!(store.clear_access_token().unwrap());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clear_session_credentials() {
        let store = MemoryCredentialStore::new();
        assert!(!clear_session_credentials(&store));

        store
            .save(ACCESS_TOKEN_KEY, SecretString::from("T1".to_string()))
            .unwrap();
        store
            .save(REFRESH_TOKEN_KEY, SecretString::from("R1".to_string()))
            .unwrap();
        assert!(clear_session_credentials(&store));
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }
}
