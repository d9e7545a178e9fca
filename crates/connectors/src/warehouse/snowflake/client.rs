use crate::warehouse::{
    base::{
        client::{WarehouseClient, WarehouseKind},
        error::WarehouseError,
    },
    snowflake::{
        response::{StatementError, StatementRequest, StatementResponse},
        settings::SnowflakeSettings,
    },
};
use async_trait::async_trait;
use reqwest::{
    Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tokio::time::{Instant, sleep};
use tracing::debug;
use uuid::Uuid;

const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

enum StatementState {
    Done(Option<String>),
    Running(String),
}

/// Snowflake reached through its SQL REST API (`/api/v2/statements`).
pub struct SnowflakeWarehouse {
    http: reqwest::Client,
    settings: SnowflakeSettings,
}

impl SnowflakeWarehouse {
    pub fn new(settings: SnowflakeSettings) -> Result<Self, WarehouseError> {
        if settings.token.trim().is_empty() {
            return Err(WarehouseError::InvalidConfig("Snowflake token is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WarehouseError::InvalidConfig(e.to_string()))?;

        Ok(SnowflakeWarehouse { http, settings })
    }

    fn headers(&self) -> Result<HeaderMap, WarehouseError> {
        let invalid = |e: reqwest::header::InvalidHeaderValue| {
            WarehouseError::InvalidConfig(format!("Invalid header value: {e}"))
        };

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.settings.token)).map_err(invalid)?,
        );
        headers.insert(
            TOKEN_TYPE_HEADER,
            HeaderValue::from_str(&self.settings.token_type).map_err(invalid)?,
        );
        Ok(headers)
    }

    async fn submit(&self, sql: &str) -> Result<StatementState, WarehouseError> {
        let url = format!("{}/api/v2/statements", self.settings.base_url());
        let body = StatementRequest {
            statement: sql,
            timeout: self.settings.timeout.as_secs(),
            database: self.settings.database.as_deref(),
            schema: self.settings.schema.as_deref(),
            warehouse: self.settings.warehouse.as_deref(),
            role: self.settings.role.as_deref(),
        };

        let response = self
            .http
            .post(&url)
            .query(&[("requestId", Uuid::new_v4().to_string())])
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        read_state(response).await
    }

    async fn poll(&self, handle: &str) -> Result<StatementState, WarehouseError> {
        let url = format!("{}/api/v2/statements/{handle}", self.settings.base_url());
        let response = self
            .http
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(transport_error)?;

        read_state(response).await
    }
}

#[async_trait]
impl WarehouseClient for SnowflakeWarehouse {
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError> {
        debug!(sql, "Submitting statement to Snowflake");
        let deadline = Instant::now() + self.settings.timeout;

        let mut state = self.submit(sql).await?;
        loop {
            match state {
                StatementState::Done(value) => return Ok(value),
                StatementState::Running(handle) => {
                    if Instant::now() >= deadline {
                        return Err(WarehouseError::Connectivity(format!(
                            "Statement {handle} did not finish within {:?}",
                            self.settings.timeout
                        )));
                    }
                    debug!(handle = %handle, "Statement still running");
                    sleep(self.settings.poll_interval).await;
                    state = self.poll(&handle).await?;
                }
            }
        }
    }

    fn kind(&self) -> WarehouseKind {
        WarehouseKind::Snowflake
    }
}

fn transport_error(err: reqwest::Error) -> WarehouseError {
    WarehouseError::Connectivity(err.to_string())
}

async fn read_state(response: Response) -> Result<StatementState, WarehouseError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    match status {
        StatusCode::OK => {
            let parsed: StatementResponse = serde_json::from_str(&body)
                .map_err(|e| WarehouseError::Protocol(format!("Invalid result body: {e}")))?;
            Ok(StatementState::Done(parsed.first_cell()))
        }
        StatusCode::ACCEPTED => {
            let parsed: StatementResponse = serde_json::from_str(&body)
                .map_err(|e| WarehouseError::Protocol(format!("Invalid status body: {e}")))?;
            parsed
                .statement_handle
                .map(StatementState::Running)
                .ok_or_else(|| WarehouseError::Protocol("202 without statementHandle".into()))
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            let err: StatementError = serde_json::from_str(&body).unwrap_or_default();
            if err.is_compilation() {
                Err(WarehouseError::Compilation(err.describe()))
            } else {
                Err(WarehouseError::Execution(err.describe()))
            }
        }
        status if status.is_client_error() => {
            let err: StatementError = serde_json::from_str(&body).unwrap_or_default();
            Err(WarehouseError::Connectivity(format!(
                "HTTP {status}: {}",
                err.describe()
            )))
        }
        status => Err(WarehouseError::Connectivity(format!(
            "HTTP {status} from Snowflake"
        ))),
    }
}
