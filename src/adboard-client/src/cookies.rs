//! Persistent cookie provider for the refresh credential.
//!
//! The API hands out its refresh credential as an http-only cookie. This jar
//! keeps that single cookie in the credential store so it survives between
//! runs, and sends it back only to the API origin.

use std::fmt;
use std::sync::Arc;

use adboard_login::{CredentialStore, REFRESH_TOKEN_KEY};
use cookie::Cookie;
use cookie::time::{Duration, OffsetDateTime};
use reqwest::Url;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

/// Name of the cookie carrying the refresh credential.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    fn of(url: &Url) -> Option<Self> {
        Some(Self {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default(),
        })
    }
}

/// [`CookieStore`] holding the refresh cookie for one API origin.
pub struct RefreshCookieJar {
    origin: Origin,
    store: Arc<dyn CredentialStore>,
}

impl RefreshCookieJar {
    /// Create a jar scoped to the origin of `base_url`.
    ///
    /// Returns `None` if the URL has no host.
    pub fn new(base_url: &Url, store: Arc<dyn CredentialStore>) -> Option<Self> {
        let origin = Origin::of(base_url)?;
        Some(Self { origin, store })
    }

    fn matches(&self, url: &Url) -> bool {
        Origin::of(url).is_some_and(|origin| origin == self.origin)
    }

    fn apply(&self, update: CookieUpdate) {
        let result = match update {
            CookieUpdate::Set(value) => {
                tracing::debug!("Storing refresh credential");
                self.store.save(REFRESH_TOKEN_KEY, value).map(|_| ())
            }
            CookieUpdate::Remove => {
                tracing::debug!("Server cleared refresh credential");
                self.store.delete(REFRESH_TOKEN_KEY).map(|_| ())
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to update stored refresh credential");
        }
    }
}

impl fmt::Debug for RefreshCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCookieJar")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl CookieStore for RefreshCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if !self.matches(url) {
            return;
        }
        for header in cookie_headers {
            let Ok(raw) = header.to_str() else {
                continue;
            };
            if let Some(update) = parse_refresh_cookie(raw) {
                self.apply(update);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        if !self.matches(url) {
            return None;
        }
        let token = self.store.refresh_token()?;
        let mut value =
            HeaderValue::from_str(&format!("{REFRESH_COOKIE_NAME}={}", token.expose_secret()))
                .ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

/// Change to the stored refresh credential requested by a `Set-Cookie` header.
#[derive(Debug)]
enum CookieUpdate {
    Set(SecretString),
    Remove,
}

/// Parse a `Set-Cookie` header, returning an update if it targets the
/// refresh cookie.
///
/// An empty value or an expired cookie removes it.
fn parse_refresh_cookie(header: &str) -> Option<CookieUpdate> {
    let cookie = Cookie::parse(header).ok()?;
    if cookie.name() != REFRESH_COOKIE_NAME {
        return None;
    }
    let value = cookie.value().trim_matches('"');

    if value.is_empty() || is_expired(&cookie) {
        Some(CookieUpdate::Remove)
    } else {
        Some(CookieUpdate::Set(SecretString::from(value.to_string())))
    }
}

/// `Max-Age` takes precedence over `Expires` (RFC 6265 section 5.3).
fn is_expired(cookie: &Cookie<'_>) -> bool {
    if let Some(max_age) = cookie.max_age() {
        return max_age <= Duration::ZERO;
    }
    cookie
        .expires_datetime()
        .is_some_and(|at| at <= OffsetDateTime::now_utc())
}
