use crate::{credentials::CredentialFile, error::ConfigError, settings::vars::Vars};
use connectors::warehouse::snowflake::settings::SnowflakeSettings;
use std::fmt;

/// Connection to the warehouse holding the destination table.
#[derive(Clone)]
pub enum WarehouseSettings {
    Snowflake(SnowflakeSettings),
    Postgres { url: String },
}

impl WarehouseSettings {
    pub fn from_vars(vars: &Vars) -> Result<Self, ConfigError> {
        let kind = vars.get_or("WAREHOUSE_KIND", "snowflake");
        let creds = CredentialFile::load(vars.require("WAREHOUSE_CREDS_FILE")?)?;

        match kind.to_lowercase().as_str() {
            "snowflake" => {
                let mut settings =
                    SnowflakeSettings::new(creds.require("account")?, creds.require("token")?);
                if let Some(token_type) = creds.get("token_type") {
                    settings.token_type = token_type.to_string();
                }
                settings.host = creds.get("host").map(str::to_string);
                settings.database = creds.get("database").map(str::to_string);
                settings.schema = creds.get("schema").map(str::to_string);
                settings.warehouse = creds.get("warehouse").map(str::to_string);
                settings.role = creds.get("role").map(str::to_string);
                Ok(WarehouseSettings::Snowflake(settings))
            }
            "postgres" | "postgresql" => Ok(WarehouseSettings::Postgres {
                url: creds.require("url")?.to_string(),
            }),
            _ => Err(ConfigError::invalid(
                "WAREHOUSE_KIND",
                kind,
                "expected 'snowflake' or 'postgres'",
            )),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            WarehouseSettings::Snowflake(_) => "snowflake",
            WarehouseSettings::Postgres { .. } => "postgres",
        }
    }
}

impl fmt::Debug for WarehouseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseSettings::Snowflake(settings) => fmt::Debug::fmt(settings, f),
            WarehouseSettings::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("url", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashMap, io::Write};
    use tempfile::NamedTempFile;

    fn settings(kind: &str, creds: &str) -> Result<WarehouseSettings, ConfigError> {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{creds}").unwrap();
        let map = HashMap::from([
            ("WAREHOUSE_KIND".to_string(), kind.to_string()),
            (
                "WAREHOUSE_CREDS_FILE".to_string(),
                file.path().display().to_string(),
            ),
        ]);
        WarehouseSettings::from_vars(&Vars::new(&map))
    }

    #[test]
    fn builds_snowflake_settings() {
        let creds = "account,acme-prod\ntoken,t0k\ntoken_type,OAUTH\ndatabase,RAW\nschema,FRESHSERVICE\n";
        let WarehouseSettings::Snowflake(sf) = settings("snowflake", creds).unwrap() else {
            panic!("expected snowflake");
        };
        assert_eq!(sf.account, "acme-prod");
        assert_eq!(sf.token_type, "OAUTH");
        assert_eq!(sf.schema.as_deref(), Some("FRESHSERVICE"));
        assert_eq!(sf.role, None);
    }

    #[test]
    fn snowflake_requires_a_token() {
        let err = settings("snowflake", "account,acme\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { ref key, .. } if key == "token"));
    }

    #[test]
    fn builds_postgres_settings() {
        let wh = settings("Postgres", "url,postgres://etl:pw@db/warehouse\n").unwrap();
        assert_eq!(wh.kind_name(), "postgres");
        assert!(!format!("{wh:?}").contains("pw"));
    }

    #[test]
    fn rejects_unknown_kinds() {
        assert!(matches!(
            settings("bigquery", "url,x\n"),
            Err(ConfigError::Invalid { key: "WAREHOUSE_KIND", .. })
        ));
    }
}
