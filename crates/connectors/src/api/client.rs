use crate::api::{
    error::ApiError,
    link::next_link,
    source::{PageRequest, PageSource},
};
use async_trait::async_trait;
use model::{pagination::page::Page, records::record::Record};
use reqwest::{
    StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, LINK, RETRY_AFTER},
};
use std::{fmt, time::Duration};
use tracing::debug;

/// Longest response body excerpt kept in an error.
const BODY_EXCERPT_LEN: usize = 512;

#[derive(Clone)]
pub struct HelpdeskSettings {
    /// e.g. `https://acme.freshservice.com/api/v2`
    pub base_url: String,
    pub api_key: String,
    /// Basic-auth password paired with the API key; the helpdesk ignores it.
    pub password: String,
    pub timeout: Duration,
}

impl HelpdeskSettings {
    pub fn for_domain(domain: &str, api_key: impl Into<String>) -> Self {
        HelpdeskSettings {
            base_url: format!("https://{domain}.freshservice.com/api/v2"),
            api_key: api_key.into(),
            password: "X".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for HelpdeskSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpdeskSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the helpdesk list endpoints.
#[derive(Clone, Debug)]
pub struct HelpdeskClient {
    http: reqwest::Client,
    settings: HelpdeskSettings,
}

impl HelpdeskClient {
    pub fn new(settings: HelpdeskSettings) -> Result<Self, ApiError> {
        if settings.api_key.trim().is_empty() {
            return Err(ApiError::Config("API key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HelpdeskClient { http, settings })
    }

    fn endpoint_url(&self, request: &PageRequest) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            request.resource.endpoint()
        )
    }
}

#[async_trait]
impl PageSource for HelpdeskClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, ApiError> {
        let url = self.endpoint_url(request);
        debug!(url = %url, page = request.cursor.page, "Requesting page");

        let response = self
            .http
            .get(&url)
            .query(&request.query_pairs())
            .basic_auth(&self.settings.api_key, Some(&self.settings.password))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        check_status(status, &headers, &body)?;

        let has_next_link = headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link)
            .is_some();

        let records = parse_records(request, &body)?;
        debug!(
            resource = %request.resource,
            page = request.cursor.page,
            records = records.len(),
            has_next_link,
            "Received page"
        );

        Ok(Page {
            cursor: request.cursor,
            records,
            has_next_link,
        })
    }
}

fn check_status(status: StatusCode, headers: &HeaderMap, body: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized { status }),
        StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited {
            retry_after: retry_after(headers),
        }),
        _ => Err(ApiError::Status {
            status,
            body: excerpt(body),
        }),
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

fn parse_records(request: &PageRequest, body: &str) -> Result<Vec<Record>, ApiError> {
    let key = request.resource.envelope_key();
    let mut json: serde_json::Value = serde_json::from_str(body)?;

    let items = match json.get_mut(key).map(serde_json::Value::take) {
        Some(serde_json::Value::Array(items)) => items,
        _ => {
            return Err(ApiError::MissingEnvelope {
                resource: request.resource,
                key: key.to_string(),
            });
        }
    };

    Ok(items
        .into_iter()
        .map(|item| Record::new(request.resource, request.cursor.page, item))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{pagination::cursor::PageCursor, resource::ResourceKind};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{basic_auth, method, path, query_param},
    };

    fn client(server: &MockServer) -> HelpdeskClient {
        let settings = HelpdeskSettings {
            base_url: format!("{}/api/v2", server.uri()),
            api_key: "key".into(),
            password: "X".into(),
            timeout: Duration::from_secs(5),
        };
        HelpdeskClient::new(settings).unwrap()
    }

    #[tokio::test]
    async fn fetches_page_with_filter_and_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/tickets"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "2"))
            .and(query_param("updated_since", "2024-01-01T00:00:00Z"))
            .and(basic_auth("key", "X"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Link", r#"<http://x/api/v2/tickets?page=2>; rel="next""#)
                    .set_body_json(json!({"tickets": [{"id": 1}, {"id": 2}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = PageRequest::new(ResourceKind::Tickets, PageCursor::first(2))
            .updated_since("2024-01-01T00:00:00Z");
        let page = client(&server).fetch_page(&request).await.unwrap();

        assert_eq!(page.len(), 2);
        assert!(page.has_next_link);
        assert_eq!(page.records[1].data["id"], 2);
    }

    #[tokio::test]
    async fn maps_auth_and_rate_limit_statuses() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v2/groups"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/api/v2/ticket_form_fields"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let client = client(&server);
        let groups = PageRequest::new(ResourceKind::AgentGroups, PageCursor::first(100));
        let fields = PageRequest::new(ResourceKind::TicketFields, PageCursor::first(100));

        let err = client.fetch_page(&groups).await.unwrap_err();
        assert!(err.is_auth());

        match client.fetch_page(&fields).await.unwrap_err() {
            ApiError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn rejects_missing_envelope_and_bad_json() {
        let server = MockServer::start().await;
        Mock::given(path("/api/v2/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"agents": []})))
            .mount(&server)
            .await;
        Mock::given(path("/api/v2/tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client(&server);
        let groups = PageRequest::new(ResourceKind::AgentGroups, PageCursor::first(100));
        let tickets = PageRequest::new(ResourceKind::Tickets, PageCursor::first(100));

        assert!(matches!(
            client.fetch_page(&groups).await,
            Err(ApiError::MissingEnvelope { .. })
        ));
        assert!(matches!(
            client.fetch_page(&tickets).await,
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn rejects_empty_key() {
        let settings = HelpdeskSettings::for_domain("acme", " ");
        assert!(matches!(
            HelpdeskClient::new(settings),
            Err(ApiError::Config(_))
        ));
    }
}
