use std::{fmt, time::Duration};

/// Connection parameters for the Snowflake SQL API.
#[derive(Clone)]
pub struct SnowflakeSettings {
    /// Account identifier, e.g. `myorg-myaccount`.
    pub account: String,
    /// Overrides `https://{account}.snowflakecomputing.com`.
    pub host: Option<String>,
    pub token: String,
    /// Value of `X-Snowflake-Authorization-Token-Type`.
    pub token_type: String,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub warehouse: Option<String>,
    pub role: Option<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl SnowflakeSettings {
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        SnowflakeSettings {
            account: account.into(),
            host: None,
            token: token.into(),
            token_type: "PROGRAMMATIC_ACCESS_TOKEN".into(),
            database: None,
            schema: None,
            warehouse: None,
            role: None,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }

    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.snowflakecomputing.com", self.account),
        }
    }
}

impl fmt::Debug for SnowflakeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeSettings")
            .field("account", &self.account)
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .finish()
    }
}
