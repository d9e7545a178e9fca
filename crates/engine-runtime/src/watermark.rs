use crate::error::RunError;
use connectors::warehouse::base::{
    client::WarehouseClient, error::WarehouseErrorKind, query::WatermarkQuery,
};
use model::watermark::Watermark;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Looks up the latest modification time already loaded into the
/// destination table.
pub struct WatermarkReader {
    client: Arc<dyn WarehouseClient>,
    query: WatermarkQuery,
}

impl WatermarkReader {
    pub fn new(client: Arc<dyn WarehouseClient>, query: WatermarkQuery) -> Self {
        WatermarkReader { client, query }
    }

    /// `None` when the table is empty or does not exist yet. Any other
    /// warehouse failure aborts the run.
    pub async fn read(&self) -> Result<Option<Watermark>, RunError> {
        let sql = self.query.to_sql(&self.client.kind());
        let table = self.query.table.as_str();

        match self.client.query_scalar(&sql).await {
            Ok(Some(raw)) => {
                let mark: Watermark = raw.trim().parse()?;
                info!(table, watermark = %mark, "Resolved watermark");
                Ok(Some(mark))
            }
            Ok(None) => {
                info!(table, "Destination table is empty; extracting everything");
                Ok(None)
            }
            Err(err) if err.kind() == WarehouseErrorKind::Compilation => {
                warn!(
                    table,
                    error = %err,
                    "Destination table is not queryable; extracting everything"
                );
                Ok(None)
            }
            Err(err) => {
                error!(
                    table,
                    warehouse = %self.client.kind(),
                    error = %err,
                    "Failed to read watermark"
                );
                Err(RunError::Watermark(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::warehouse::base::{client::WarehouseKind, error::WarehouseError};
    use tracing_test::traced_test;

    struct Scripted(fn() -> Result<Option<String>, WarehouseError>);

    #[async_trait]
    impl WarehouseClient for Scripted {
        async fn query_scalar(&self, _sql: &str) -> Result<Option<String>, WarehouseError> {
            (self.0)()
        }

        fn kind(&self) -> WarehouseKind {
            WarehouseKind::Other("scripted".into())
        }
    }

    fn reader(script: fn() -> Result<Option<String>, WarehouseError>) -> WatermarkReader {
        WatermarkReader::new(Arc::new(Scripted(script)), WatermarkQuery::default())
    }

    #[tokio::test]
    async fn parses_warehouse_text() {
        let mark = reader(|| Ok(Some("2024-05-01 08:00:00.000+00".into())))
            .read()
            .await
            .unwrap();
        assert_eq!(mark.unwrap().to_string(), "2024-05-01T08:00:00Z");
    }

    #[tokio::test]
    async fn epoch_result_is_utc_whatever_the_session_zone() {
        // 2024-03-01T00:00:00Z; a Tokyo session still reports the instant.
        let mark = reader(|| Ok(Some("1709251200".into())))
            .read()
            .await
            .unwrap();
        assert_eq!(mark.unwrap().to_string(), "2024-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn empty_table_has_no_watermark() {
        assert_eq!(reader(|| Ok(None)).read().await.unwrap(), None);
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_table_is_recovered_with_a_warning() {
        let mark = reader(|| {
            Err(WarehouseError::Compilation(
                "SQL compilation error: Object 'TICKETS' does not exist".into(),
            ))
        })
        .read()
        .await
        .unwrap();

        assert_eq!(mark, None);
        assert!(logs_contain("not queryable"));
    }

    #[tokio::test]
    async fn connectivity_failure_aborts() {
        let err = reader(|| Err(WarehouseError::Connectivity("connection refused".into())))
            .read()
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Watermark(_)));

        let err = reader(|| Ok(Some("garbage".into()))).read().await.unwrap_err();
        assert!(matches!(err, RunError::InvalidWatermark(_)));
    }
}
