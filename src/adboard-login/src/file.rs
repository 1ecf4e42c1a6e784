//! File-based credential storage.
//!
//! Entries are kept in a single JSON object in `<adboard home>/credentials.json`,
//! written with owner-only permissions. The file is removed once the last
//! entry is deleted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use adboard_common::{AppDirs, write_owner_only};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::constants::CREDENTIALS_FILE;
use crate::store::CredentialStore;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(flatten)]
    entries: BTreeMap<String, String>,
}

/// Credential store backed by a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Store at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<home>/credentials.json`.
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(CREDENTIALS_FILE))
    }

    /// Store in the default adboard home (`ADBOARD_HOME` or `~/.adboard`).
    pub fn open_default() -> Result<Self> {
        let dirs = AppDirs::new().context("Could not determine the adboard home directory")?;
        Ok(Self::new(dirs.credentials_file()))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials file: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(StoredCredentials::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", self.path.display()))
    }

    fn write(&self, stored: &StoredCredentials) -> Result<()> {
        if stored.entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).with_context(|| {
                    format!("Failed to delete credentials file: {}", self.path.display())
                })?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json =
            serde_json::to_string_pretty(stored).context("Failed to serialize credentials")?;
        write_owner_only(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write credentials file: {}", self.path.display()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, key: &str) -> Result<Option<SecretString>> {
        let _guard = self.lock.lock();
        let stored = self.read()?;
        Ok(stored.entries.get(key).cloned().map(SecretString::from))
    }

    fn save(&self, key: &str, value: SecretString) -> Result<()> {
        let _guard = self.lock.lock();
        let mut stored = self.read()?;
        stored
            .entries
            .insert(key.to_string(), value.expose_secret().to_string());
        self.write(&stored)?;
        tracing::debug!(key, path = %self.path.display(), "Saved credential");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.lock();
        let mut stored = self.read()?;
        if stored.entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write(&stored)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    #[test]
    fn test_missing_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::in_home(temp.path());
        assert!(store.load(ACCESS_TOKEN_KEY).unwrap().is_none());
        assert!(!store.delete(ACCESS_TOKEN_KEY).unwrap());
    }

    #[test]
    fn test_entries_persist_across_instances() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::in_home(temp.path());
        store
            .save(ACCESS_TOKEN_KEY, SecretString::from("T1".to_string()))
            .unwrap();
        store
            .save(REFRESH_TOKEN_KEY, SecretString::from("R1".to_string()))
            .unwrap();

        let reopened = FileCredentialStore::in_home(temp.path());
        let token = reopened.load(ACCESS_TOKEN_KEY).unwrap().unwrap();
        assert_eq!(token.expose_secret(), "T1");
        let refresh = reopened.load(REFRESH_TOKEN_KEY).unwrap().unwrap();
        assert_eq!(refresh.expose_secret(), "R1");
    }

    #[test]
    fn test_delete_last_entry_removes_file() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::in_home(temp.path());
        store
            .save(ACCESS_TOKEN_KEY, SecretString::from("T1".to_string()))
            .unwrap();
        assert!(store.path().exists());

        assert!(store.delete(ACCESS_TOKEN_KEY).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_reports_error() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::in_home(temp.path());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(store.load(ACCESS_TOKEN_KEY).is_err());
        // The convenience accessor treats unreadable storage as anonymous.
        assert!(store.access_token().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::in_home(temp.path());
        store
            .save(ACCESS_TOKEN_KEY, SecretString::from("T1".to_string()))
            .unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
