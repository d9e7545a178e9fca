use crate::warehouse::base::error::WarehouseError;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseKind {
    Snowflake,
    Postgres,
    Other(String),
}

impl fmt::Display for WarehouseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarehouseKind::Snowflake => f.write_str("snowflake"),
            WarehouseKind::Postgres => f.write_str("postgres"),
            WarehouseKind::Other(name) => f.write_str(name),
        }
    }
}

/// Read-only access to the destination warehouse.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Runs a statement returning at most one row with one column and
    /// yields that cell as text (`None` for SQL NULL or no row).
    async fn query_scalar(&self, sql: &str) -> Result<Option<String>, WarehouseError>;

    fn kind(&self) -> WarehouseKind;
}
