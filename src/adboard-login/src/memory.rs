//! In-memory credential storage.

use std::collections::HashMap;

use anyhow::Result;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};

use crate::store::CredentialStore;

/// Credential store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, SecretString>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with an access token.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(
            crate::ACCESS_TOKEN_KEY.to_string(),
            SecretString::from(token.into()),
        );
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> Result<Option<SecretString>> {
        Ok(self
            .entries
            .lock()
            .get(key)
            .map(|value| SecretString::from(value.expose_secret().to_string())))
    }

    fn save(&self, key: &str, value: SecretString) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        f.debug_struct("MemoryCredentialStore")
            .field("keys", &keys)
            .finish()
    }
}
