//! HTTP client for the campaign analytics API.
//!
//! The [`ApiClient`] attaches the stored bearer token to every request and
//! recovers from an expired token with a single silent refresh:
//!
//! - the first request rejected with 401 starts the refresh
//! - requests rejected while the refresh is in flight are queued and replayed
//!   with the new token once it lands
//! - if the refresh fails, every queued request is rejected and one
//!   [`AuthEvent::SessionExpired`] is broadcast to subscribers
//!
//! Endpoint wrappers live in [`api`]; response payloads are decoded into the
//! typed [`models`] and validated before they reach callers.

pub mod api;
mod client;
mod cookies;
mod error;
mod events;
pub mod models;
mod refresh;
pub mod report;
mod request;

pub use client::{ApiClient, ClientConfig, DEFAULT_API_URL, REFRESH_PATH};
pub use cookies::{REFRESH_COOKIE_NAME, RefreshCookieJar};
pub use error::{ApiError, Result};
pub use events::{AuthEvent, AuthEvents};
pub use models::{
    AssignableRole, Campaign, CampaignDetail, CampaignPage, CampaignPeriod, CampaignQuery,
    CampaignSite, CreateUserRequest, DateRange, RegisterRequest, Role, TokenResponse, User,
};
pub use request::{ApiRequest, RequestBody};
