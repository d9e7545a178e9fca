use model::resource::ResourceKind;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the helpdesk API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API rejected the credentials.
    #[error("Authentication failed with HTTP {status}")]
    Unauthorized { status: StatusCode },

    /// The API asked the client to slow down.
    #[error("Rate limited; retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not valid JSON.
    #[error("Malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response did not wrap its records in the expected key.
    #[error("Response for {resource} has no '{key}' array")]
    MissingEnvelope { resource: ResourceKind, key: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { status } | ApiError::Status { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
