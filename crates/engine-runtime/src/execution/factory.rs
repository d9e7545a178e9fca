use crate::error::RunError;
use connectors::{
    api::{client::HelpdeskClient, source::PageSource},
    storage::store::{BlobStore, StageStore},
    warehouse::{
        base::client::WarehouseClient, postgres::client::PgWarehouse,
        snowflake::client::SnowflakeWarehouse,
    },
};
use engine_config::settings::{EtlConfig, warehouse::WarehouseSettings};
use std::sync::Arc;
use tracing::info;

/// External systems a run talks to.
#[derive(Clone)]
pub struct Components {
    pub source: Arc<dyn PageSource>,
    pub warehouse: Arc<dyn WarehouseClient>,
    pub stage: Arc<dyn BlobStore>,
}

impl Components {
    pub async fn from_config(config: &EtlConfig) -> Result<Self, RunError> {
        Ok(Components {
            source: helpdesk_source(config)?,
            warehouse: connect_warehouse(&config.warehouse).await?,
            stage: open_stage(config)?,
        })
    }
}

pub fn helpdesk_source(config: &EtlConfig) -> Result<Arc<dyn PageSource>, RunError> {
    Ok(Arc::new(HelpdeskClient::new(config.helpdesk.clone())?))
}

pub async fn connect_warehouse(
    settings: &WarehouseSettings,
) -> Result<Arc<dyn WarehouseClient>, RunError> {
    info!(warehouse = settings.kind_name(), "Connecting to warehouse");
    let client: Arc<dyn WarehouseClient> = match settings {
        WarehouseSettings::Snowflake(sf) => {
            Arc::new(SnowflakeWarehouse::new(sf.clone()).map_err(RunError::Watermark)?)
        }
        WarehouseSettings::Postgres { url } => {
            Arc::new(PgWarehouse::connect(url).await.map_err(RunError::Watermark)?)
        }
    };
    Ok(client)
}

pub fn open_stage(config: &EtlConfig) -> Result<Arc<dyn BlobStore>, RunError> {
    let stage = &config.stage;
    let store = StageStore::from_url(&stage.url, &stage.prefix, &stage.credentials)?;
    info!(stage = ?store, "Opened stage");
    Ok(Arc::new(store))
}
