//! Common utilities shared across adboard crates.

pub mod dirs;
pub mod file_permissions;
pub mod http_client;

pub use dirs::{AppDirs, HOME_ENV_VAR, get_adboard_home};
pub use file_permissions::{set_owner_only, write_owner_only};
pub use http_client::{DEFAULT_TIMEOUT, POOL_IDLE_TIMEOUT, USER_AGENT, create_client_builder};
