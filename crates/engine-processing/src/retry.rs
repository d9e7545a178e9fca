use connectors::api::error::ApiError;
use engine_core::retry::RetryDisposition;
use std::time::Duration;

/// Wait applied to a 429 that carries no `Retry-After` header.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

pub fn classify_api_error(err: &ApiError) -> RetryDisposition {
    match err {
        ApiError::RateLimited { retry_after } => {
            RetryDisposition::RetryAfter(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT))
        }
        ApiError::Transport(e) => classify_transport_error(e),
        ApiError::Status { status, .. } if status.is_server_error() => RetryDisposition::Retry,
        ApiError::Status { .. } => RetryDisposition::Stop,
        ApiError::Unauthorized { .. } => RetryDisposition::Stop,
        ApiError::Decode(_) => RetryDisposition::Stop,
        ApiError::MissingEnvelope { .. } => RetryDisposition::Stop,
        ApiError::Config(_) => RetryDisposition::Stop,
    }
}

fn classify_transport_error(err: &reqwest::Error) -> RetryDisposition {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        return RetryDisposition::Retry;
    }

    match err.status() {
        Some(status) if status.is_server_error() => RetryDisposition::Retry,
        _ => RetryDisposition::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::resource::ResourceKind;
    use reqwest::StatusCode;

    #[test]
    fn rate_limits_wait_for_the_server() {
        let hinted = ApiError::RateLimited {
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(
            classify_api_error(&hinted),
            RetryDisposition::RetryAfter(Duration::from_secs(7))
        );

        let bare = ApiError::RateLimited { retry_after: None };
        assert_eq!(
            classify_api_error(&bare),
            RetryDisposition::RetryAfter(DEFAULT_RATE_LIMIT_WAIT)
        );
    }

    #[test]
    fn server_errors_retry_client_errors_stop() {
        let unavailable = ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        let not_found = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert_eq!(classify_api_error(&unavailable), RetryDisposition::Retry);
        assert_eq!(classify_api_error(&not_found), RetryDisposition::Stop);
    }

    #[test]
    fn payload_and_auth_errors_are_fatal() {
        let unauthorized = ApiError::Unauthorized {
            status: StatusCode::UNAUTHORIZED,
        };
        let envelope = ApiError::MissingEnvelope {
            resource: ResourceKind::AgentGroups,
            key: "groups".into(),
        };
        assert_eq!(classify_api_error(&unauthorized), RetryDisposition::Stop);
        assert_eq!(classify_api_error(&envelope), RetryDisposition::Stop);
    }
}
