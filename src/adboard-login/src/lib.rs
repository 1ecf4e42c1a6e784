//! adboard login - credential storage for the adboard API client.
//!
//! Credentials are kept as named entries, mirroring browser local storage:
//! - `access_token`: the short-lived bearer token; absence means anonymous
//! - `refresh_token`: the refresh credential captured from the server cookie
//!
//! Storage backends:
//! - JSON file with owner-only permissions (0600)
//! - In-memory store for tests and ephemeral sessions

pub mod constants;
mod file;
mod memory;
mod store;
mod utils;

pub use constants::{ACCESS_TOKEN_KEY, CREDENTIALS_FILE, REFRESH_TOKEN_KEY};
pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use store::{CredentialStore, clear_session_credentials};
pub use utils::safe_format_key;

pub use secrecy::{ExposeSecret, SecretString};
