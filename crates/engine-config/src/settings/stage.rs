use crate::{error::ConfigError, settings::vars::Vars};
use connectors::storage::{store::StageCredentials, url_parser::BackendConfig};

pub const DEFAULT_STAGE_PREFIX: &str = "API_FRESHSERVICE";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 256 * 1024 * 1024;

/// Where the staged CSV files go.
#[derive(Debug, Clone)]
pub struct StageSettings {
    pub url: String,
    pub prefix: String,
    pub credentials: StageCredentials,
    pub max_file_bytes: u64,
}

impl StageSettings {
    pub fn from_vars(vars: &Vars) -> Result<Self, ConfigError> {
        let url = vars.require("STAGE_URL")?;
        BackendConfig::parse_url(url)
            .map_err(|e| ConfigError::invalid("STAGE_URL", url, e.to_string()))?;

        let credentials = StageCredentials {
            sas_token: vars.get("STAGE_SAS_TOKEN").map(str::to_string),
            access_key: vars.get("STAGE_ACCESS_KEY").map(str::to_string),
        };
        if credentials.sas_token.is_some() && credentials.access_key.is_some() {
            return Err(ConfigError::Conflict(
                "Set only one of STAGE_SAS_TOKEN and STAGE_ACCESS_KEY".into(),
            ));
        }

        let max_file_bytes = vars.parse_or("STAGE_MAX_FILE_BYTES", DEFAULT_MAX_FILE_BYTES)?;
        if max_file_bytes == 0 {
            return Err(ConfigError::invalid(
                "STAGE_MAX_FILE_BYTES",
                "0",
                "must be positive",
            ));
        }

        Ok(StageSettings {
            url: url.to_string(),
            prefix: vars
                .get_or("STAGE_PREFIX", DEFAULT_STAGE_PREFIX)
                .trim_matches('/')
                .to_string(),
            credentials,
            max_file_bytes,
        })
    }
}
