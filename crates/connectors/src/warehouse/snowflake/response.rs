use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct StatementRequest<'a> {
    pub statement: &'a str,
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}

/// Body of a 200 (result) or 202 (still running) response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatementResponse {
    #[serde(default)]
    pub statement_handle: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Option<String>>>>,
}

impl StatementResponse {
    pub fn first_cell(self) -> Option<String> {
        self.data?.into_iter().next()?.into_iter().next().flatten()
    }
}

/// Body of a 4xx/5xx response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatementError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sql_state: Option<String>,
}

impl StatementError {
    /// Snowflake reports missing objects as `SQL compilation error: ...`
    /// with a class-42 SQL state.
    pub fn is_compilation(&self) -> bool {
        let by_message = self
            .message
            .as_deref()
            .is_some_and(|m| m.contains("SQL compilation error"));
        let by_state = self.sql_state.as_deref().is_some_and(|s| s.starts_with("42"));
        by_message || by_state
    }

    pub fn describe(&self) -> String {
        format!(
            "{} (code {}, sqlState {})",
            self.message.as_deref().unwrap_or("no message"),
            self.code.as_deref().unwrap_or("-"),
            self.sql_state.as_deref().unwrap_or("-"),
        )
    }
}
