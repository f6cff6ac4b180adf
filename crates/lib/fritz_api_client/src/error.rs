//! Client error types.

use fritz_core::adapter::AdapterError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSRF token")]
    InvalidCsrfToken,

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status. `message` is the server's error text.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// `{"error": "..."}` or validator style `{"errors": [...]}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl ClientError {
    /// Build a status error from a response body.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let message = match parsed {
            Some(ErrorBody { error: Some(e), .. }) if !e.is_empty() => e,
            Some(ErrorBody { errors, .. }) if !errors.is_empty() => errors.join("; "),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Self::Status { status, message }
    }
}

impl From<ClientError> for AdapterError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Status { status, message } => {
                if message.contains("already exists") || status == StatusCode::CONFLICT {
                    AdapterError::Conflict(message)
                } else if status == StatusCode::NOT_FOUND {
                    AdapterError::NotFound(message)
                } else if status.is_client_error() {
                    AdapterError::Rejected(message)
                } else if matches!(
                    status,
                    StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                ) {
                    AdapterError::Unavailable(message)
                } else {
                    AdapterError::Internal(message)
                }
            }
            ClientError::Transport { .. } => AdapterError::Unavailable(e.to_string()),
            ClientError::InvalidUrl(_)
            | ClientError::InvalidCsrfToken
            | ClientError::Decode { .. } => AdapterError::Internal(e.to_string()),
        }
    }
}
