//! Run configuration assembled from a flat key/value map (process
//! environment merged with an optional `.env` file).

use crate::{
    credentials::read_api_key,
    error::ConfigError,
    settings::{stage::StageSettings, vars::Vars, warehouse::WarehouseSettings},
};
use connectors::{api::client::HelpdeskSettings, warehouse::base::query::WatermarkQuery};
use engine_core::retry::RetryPolicy;
use model::core::utils::{format_timestamp, parse_timestamp};
use std::{collections::HashMap, time::Duration};
use tracing::debug;

pub mod stage;
pub mod vars;
pub mod warehouse;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_FULL_EXTRACT_SINCE: &str = "2001-04-16T00:00:00Z";

/// Everything a run needs. Built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub helpdesk: HelpdeskSettings,
    pub page_size: u32,
    pub retry: RetryPolicy,
    /// `updated_since` sent for tickets when the destination has no watermark.
    pub full_extract_since: String,
    pub warehouse: WarehouseSettings,
    pub watermark_query: WatermarkQuery,
    pub stage: StageSettings,
}

impl EtlConfig {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let vars = Vars::new(map);

        let helpdesk = helpdesk_settings(&vars)?;

        let page_size = vars.parse_or("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid(
                "PAGE_SIZE",
                &page_size.to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let retry = RetryPolicy::new(
            vars.parse_or("API_MAX_ATTEMPTS", 5usize)?,
            Duration::from_millis(vars.parse_or("API_RETRY_BASE_MS", 500u64)?),
            Duration::from_millis(vars.parse_or("API_RETRY_MAX_MS", 60_000u64)?),
        );

        let since = vars.get_or("FULL_EXTRACT_SINCE", DEFAULT_FULL_EXTRACT_SINCE);
        let full_extract_since = parse_timestamp(since)
            .map(|ts| format_timestamp(&ts))
            .ok_or_else(|| ConfigError::invalid("FULL_EXTRACT_SINCE", since, "not a timestamp"))?;

        let defaults = WatermarkQuery::default();
        let watermark_query = WatermarkQuery {
            table: vars.get_or("WATERMARK_TABLE", &defaults.table).to_string(),
            updated_column: vars
                .get_or("WATERMARK_UPDATED_COLUMN", &defaults.updated_column)
                .to_string(),
            created_column: vars
                .get_or("WATERMARK_CREATED_COLUMN", &defaults.created_column)
                .to_string(),
        };

        let config = EtlConfig {
            helpdesk,
            page_size,
            retry,
            full_extract_since,
            warehouse: WarehouseSettings::from_vars(&vars)?,
            watermark_query,
            stage: StageSettings::from_vars(&vars)?,
        };
        debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

fn helpdesk_settings(vars: &Vars) -> Result<HelpdeskSettings, ConfigError> {
    let api_key = match (vars.get("HELPDESK_API_KEY"), vars.get("HELPDESK_API_KEY_FILE")) {
        (Some(key), None) => key.to_string(),
        (None, Some(path)) => read_api_key(path)?,
        (Some(_), Some(_)) => {
            return Err(ConfigError::Conflict(
                "Set only one of HELPDESK_API_KEY and HELPDESK_API_KEY_FILE".into(),
            ));
        }
        (None, None) => return Err(ConfigError::Missing("HELPDESK_API_KEY")),
    };

    let base_url = match (vars.get("HELPDESK_BASE_URL"), vars.get("HELPDESK_DOMAIN")) {
        (Some(url), _) if url.starts_with("http://") || url.starts_with("https://") => {
            url.trim_end_matches('/').to_string()
        }
        (Some(url), _) => {
            return Err(ConfigError::invalid(
                "HELPDESK_BASE_URL",
                url,
                "expected an http(s) URL",
            ));
        }
        (None, Some(domain)) => HelpdeskSettings::for_domain(domain, "").base_url,
        (None, None) => return Err(ConfigError::Missing("HELPDESK_DOMAIN")),
    };

    Ok(HelpdeskSettings {
        base_url,
        api_key,
        password: vars.get_or("HELPDESK_PASSWORD", "X").to_string(),
        timeout: Duration::from_secs(vars.parse_or("API_TIMEOUT_SECS", 60u64)?),
    })
}
