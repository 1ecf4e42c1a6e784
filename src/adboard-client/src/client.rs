//! API client with bearer authentication and silent token refresh.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adboard_common::{DEFAULT_TIMEOUT, create_client_builder};
use adboard_login::CredentialStore;
use reqwest::{Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::cookies::RefreshCookieJar;
use crate::error::{ApiError, Result};
use crate::events::{AuthEvent, AuthEvents};
use crate::models::{TokenPayload, TokenResponse};
use crate::refresh::{self, RefreshCoordinator, RefreshTicket};
use crate::request::{ApiRequest, RequestBody};

/// API used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Endpoint exchanging the refresh cookie for a new access token.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Applied to every request, including the refresh call.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the campaign analytics API.
///
/// Cheap to clone; clones share the connection pool, the credential store
/// and the refresh state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator<Response>,
    events: AuthEvents,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client talking to `config.base_url`.
    ///
    /// The access token is read from `credentials` before every request, and
    /// the refresh cookie issued by the API is persisted there too.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let raw = config.base_url.trim();
        let url = Url::parse(raw)
            .map_err(|e| ApiError::Config(format!("invalid API URL '{raw}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "API URL must use http or https: {raw}"
            )));
        }

        let jar = RefreshCookieJar::new(&url, Arc::clone(&credentials))
            .ok_or_else(|| ApiError::Config(format!("API URL has no host: {raw}")))?;

        let http = create_client_builder(config.timeout)
            .cookie_provider(Arc::new(jar))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: raw.trim_end_matches('/').to_string(),
                credentials,
                refresh: RefreshCoordinator::new(),
                events: AuthEvents::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Credential store holding the access token and refresh cookie.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Subscribe to authentication events.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a token refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_in_flight()
    }

    /// Number of requests parked behind the in-flight refresh.
    pub fn pending_requests(&self) -> usize {
        self.inner.refresh.pending_len()
    }

    /// Send `request` and return the successful response.
    ///
    /// A 401 on a request that has not been replayed yet joins the refresh
    /// protocol; every other failure is returned unchanged.
    pub async fn execute(&self, request: ApiRequest) -> Result<Response> {
        let token = self.inner.credentials.access_token();
        let response = self.dispatch(&request, token.as_ref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED && request.recovers_auth() {
            debug!(path = request.path(), "Access token rejected");
            return self.recover(request).await;
        }
        check_status(response).await
    }

    /// Send `request` and decode the JSON response body.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.execute(request).await?;
        decode_json(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn recover(&self, mut request: ApiRequest) -> Result<Response> {
        request.mark_retried();

        let (lease, request) = match self.inner.refresh.join(request) {
            RefreshTicket::Queued(receiver) => {
                return receiver.await.unwrap_or_else(|_| Err(refresh::cancelled()));
            }
            RefreshTicket::Leader(lease, request) => (lease, request),
        };

        let outcome = self.refresh_access_token().await;
        let pending = lease.settle();

        match outcome {
            Ok(token) => {
                info!(queued = pending.len(), "Access token refreshed");
                for entry in pending {
                    let client = self.clone();
                    let token = Arc::clone(&token);
                    tokio::spawn(async move {
                        let outcome = client.replay(&entry.request, &token).await;
                        entry.respond(outcome);
                    });
                }
                self.replay(&request, &token).await
            }
            Err(err) => {
                warn!(error = %err, queued = pending.len(), "Token refresh failed");
                for entry in pending {
                    entry.respond(Err(err.clone()));
                }
                self.inner.events.session_expired();
                Err(err)
            }
        }
    }

    /// Exchange the refresh cookie for a new access token and persist it.
    ///
    /// Sent straight to the transport: no bearer header, no 401 handling.
    async fn refresh_access_token(&self) -> Result<Arc<SecretString>> {
        let url = self.url(REFRESH_PATH);
        debug!("Refreshing access token");

        let response = self
            .inner
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::transport(&url, &e))?;
        let response = check_status(response).await?;
        let payload: TokenPayload = decode_json(response).await?;
        let token = TokenResponse::try_from(payload)?;

        let access_token = Arc::new(token.access_token);
        self.inner
            .credentials
            .set_access_token(SecretString::from(access_token.expose_secret().to_owned()))
            .map_err(ApiError::storage)?;
        Ok(access_token)
    }

    async fn replay(&self, request: &ApiRequest, token: &SecretString) -> Result<Response> {
        let response = self.dispatch(request, Some(token)).await?;
        check_status(response).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<Response> {
        let url = self.url(request.path());
        debug!(
            method = %request.method(),
            path = request.path(),
            retried = request.is_retried(),
            authenticated = token.is_some(),
            "Sending API request"
        );

        let mut builder = self.inner.http.request(request.method().clone(), &url);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder.send().await.map_err(|e| {
            warn!(path = request.path(), error = %e, "API request failed");
            ApiError::transport(&url, &e)
        })
    }
}

/// Pass successful responses through; turn everything else into an error.
async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let err = ApiError::from_response(response).await;
    debug!(status = %status, error = %err, "API error response");
    Err(err)
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let endpoint = response.url().path().to_string();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::transport(&endpoint, &e))?;
    serde_json::from_slice(&body)
        .map_err(|e| ApiError::DataFormat(format!("{endpoint}: {e}")))
}
