//! Endpoint wrappers on [`ApiClient`](crate::ApiClient).
//!
//! # Endpoints
//! - POST /auth/token - Exchange email and password for an access token
//! - GET /auth/me - Current user
//! - POST /auth/register - Create an account
//! - POST /auth/logout - Revoke the refresh credential
//! - POST /auth/create_user - Owner creates a user in their company
//! - GET /campaigns/ - Paged campaign listing
//! - GET /campaigns/{name} - Campaign with periods and sites
//! - GET /campaigns/search-by-date/ - Campaigns within a date range

mod auth;
mod campaigns;
mod users;

pub use auth::{LOGOUT_PATH, ME_PATH, REGISTER_PATH, TOKEN_PATH};
pub use campaigns::{CAMPAIGNS_PATH, SEARCH_BY_DATE_PATH};
pub use users::CREATE_USER_PATH;
