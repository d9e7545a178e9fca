use crate::warehouse::{
    base::{
        client::{WarehouseClient, WarehouseKind},
        error::WarehouseError,
    },
    postgres::utils::{classify_pg_error, connect_client},
};
use async_trait::async_trait;
use tokio_postgres::Client;
use tracing::debug;

/// Postgres-compatible warehouse, reached through `tokio-postgres`.
pub struct PgWarehouse {
    client: Client,
}

impl PgWarehouse {
    pub async fn connect(url: &str) -> Result<Self, WarehouseError> {
        let client = connect_client(url).await?;
        Ok(PgWarehouse { client })
    }
}

#[async_trait]
impl WarehouseClient for PgWarehouse {
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError> {
        debug!(sql, "Running scalar query on Postgres");
        let row = self
            .client
            .query_opt(sql, &[])
            .await
            .map_err(classify_pg_error)?;

        match row {
            Some(row) => row
                .try_get::<_, Option<String>>(0)
                .map_err(|e| WarehouseError::Protocol(e.to_string())),
            None => Ok(None),
        }
    }

    fn kind(&self) -> WarehouseKind {
        WarehouseKind::Postgres
    }
}
