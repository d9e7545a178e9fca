#![allow(dead_code)]

use connectors::storage::store::{BlobStore, StageStore};
use engine_config::settings::EtlConfig;
use engine_runtime::{
    error::RunError,
    execution::{
        executor::EtlRunner,
        factory::{Components, connect_warehouse, helpdesk_source},
    },
    report::RunReport,
};
use object_store::memory::InMemory;
use std::{collections::HashMap, io::Write, sync::Arc};
use tempfile::NamedTempFile;
use wiremock::MockServer;

pub mod integration;
pub mod utils;

const STAGE_PREFIX: &str = "API_FRESHSERVICE";

/// A mock helpdesk, a mock Snowflake SQL API and an in-memory stage wired
/// into one run configuration.
pub struct Harness {
    pub helpdesk: MockServer,
    pub snowflake: MockServer,
    pub stage: Arc<StageStore>,
    pub config: EtlConfig,
    _creds: NamedTempFile,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    /// Starts the mock servers; `overrides` replace or extend the default
    /// environment.
    pub async fn start_with(overrides: &[(&str, &str)]) -> Self {
        let helpdesk = MockServer::start().await;
        let snowflake = MockServer::start().await;

        let mut creds = NamedTempFile::new().expect("create creds file");
        writeln!(
            creds,
            "account,test-account\ntoken,wh-token\nhost,{}\ndatabase,RAW\nschema,FRESHSERVICE",
            snowflake.uri()
        )
        .expect("write creds file");

        let mut env: HashMap<String, String> = [
            ("HELPDESK_BASE_URL", format!("{}/api/v2", helpdesk.uri())),
            ("HELPDESK_API_KEY", "api-key".to_string()),
            ("WAREHOUSE_CREDS_FILE", creds.path().display().to_string()),
            ("STAGE_URL", "memory://".to_string()),
            ("STAGE_PREFIX", STAGE_PREFIX.to_string()),
            ("API_MAX_ATTEMPTS", "3".to_string()),
            ("API_RETRY_BASE_MS", "0".to_string()),
            ("API_TIMEOUT_SECS", "5".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }

        let config = EtlConfig::from_map(&env).expect("valid test configuration");
        let stage = Arc::new(StageStore::with_store(
            Arc::new(InMemory::new()),
            STAGE_PREFIX,
        ));

        Harness {
            helpdesk,
            snowflake,
            stage,
            config,
            _creds: creds,
        }
    }

    pub async fn components(&self) -> Components {
        Components {
            source: helpdesk_source(&self.config).expect("helpdesk client"),
            warehouse: connect_warehouse(&self.config.warehouse)
                .await
                .expect("snowflake client"),
            stage: self.stage.clone(),
        }
    }

    pub async fn try_run(&self) -> Result<RunReport, RunError> {
        EtlRunner::new(&self.config, self.components().await)
            .execute()
            .await
    }

    pub async fn run(&self) -> RunReport {
        self.try_run().await.expect("run completes")
    }

    pub async fn stage_names(&self) -> Vec<String> {
        self.stage.list().await.expect("list stage")
    }

    pub async fn stage_text(&self, name: &str) -> String {
        let bytes = self.stage.get(name).await.expect("stage object exists");
        String::from_utf8(bytes.to_vec()).expect("utf-8 csv")
    }

    pub async fn stage_put(&self, name: &str, body: &'static str) {
        self.stage
            .put(name, body.as_bytes().to_vec().into())
            .await
            .expect("seed stage object");
    }

    /// Requests the mock helpdesk received for one endpoint.
    pub async fn helpdesk_requests(&self, endpoint: &str) -> Vec<wiremock::Request> {
        let path = format!("/api/v2/{endpoint}");
        self.helpdesk
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}
