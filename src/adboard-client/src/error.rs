//! Error types for the API client.

use reqwest::{Response, StatusCode};
use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the API client.
///
/// Variants carry rendered messages rather than source errors so a single
/// refresh failure can be handed to every queued request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Timeout, refused connection, or any other transport failure.
    #[error("Connection failed to {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Credentials rejected by the token exchange.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// 401 on an authenticated call that could not be recovered.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Request rejected by the server as invalid (4xx on a form submission).
    #[error("{0}")]
    Validation(String),

    /// Response body did not match the expected schema.
    #[error("Unexpected response format: {0}")]
    DataFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build a transport error for `endpoint`.
    pub(crate) fn transport(endpoint: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            format!("could not connect: {err}")
        } else {
            err.to_string()
        };
        Self::Network {
            endpoint: endpoint.to_string(),
            message,
        }
    }

    /// Build an error from a non-success response, consuming its body.
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = detail_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Reinterpret a 401 from the token exchange as rejected credentials.
    pub(crate) fn into_authentication(self) -> Self {
        match self {
            Self::Unauthorized(message) => Self::Authentication(message),
            other => other,
        }
    }

    /// Reinterpret a client error (4xx other than 401) as a validation failure.
    pub(crate) fn into_validation(self) -> Self {
        match self {
            Self::NotFound(message) => Self::Validation(message),
            Self::Status { status, message } if (400..500).contains(&status) => {
                Self::Validation(message)
            }
            other => other,
        }
    }
}

/// Extract the human-readable `detail` from an error body.
///
/// The API returns either `{"detail": "..."}` or a list of field errors
/// `{"detail": [{"loc": [...], "msg": "..."}]}`.
fn detail_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
