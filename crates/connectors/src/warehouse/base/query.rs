use crate::warehouse::base::client::WarehouseKind;

/// Identifies the destination table and its modification columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkQuery {
    pub table: String,
    pub updated_column: String,
    pub created_column: String,
}

impl Default for WatermarkQuery {
    fn default() -> Self {
        WatermarkQuery {
            table: "TICKETS".into(),
            updated_column: "UPDATED_AT".into(),
            created_column: "CREATED_AT".into(),
        }
    }
}

impl WatermarkQuery {
    /// `max(coalesce(updated_at, created_at))` as whole seconds since the
    /// Unix epoch. Zoned columns yield their UTC instant and naive columns
    /// are read as UTC, so the result does not depend on the session time
    /// zone.
    pub fn to_sql(&self, kind: &WarehouseKind) -> String {
        let latest = format!(
            "MAX(COALESCE({}, {}))",
            quote_ident(&self.updated_column),
            quote_ident(&self.created_column),
        );
        let epoch = match kind {
            WarehouseKind::Snowflake => format!("TO_VARCHAR(DATE_PART(EPOCH_SECOND, {latest}))"),
            WarehouseKind::Postgres | WarehouseKind::Other(_) => {
                format!("CAST(CAST(FLOOR(EXTRACT(EPOCH FROM {latest})) AS BIGINT) AS TEXT)")
            }
        };
        format!(
            "SELECT {epoch} AS WATERMARK FROM {table}",
            table = quote_path(&self.table)
        )
    }
}

/// Leaves plain identifiers bare so the warehouse applies its own case
/// folding; anything else is double-quoted.
fn quote_ident(ident: &str) -> String {
    let plain = ident
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !ident.starts_with(|c: char| c.is_ascii_digit());
    if plain && !ident.is_empty() {
        ident.to_string()
    } else {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }
}

fn quote_path(path: &str) -> String {
    path.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_epoch_statement_per_warehouse() {
        let query = WatermarkQuery::default();
        assert_eq!(
            query.to_sql(&WarehouseKind::Snowflake),
            "SELECT TO_VARCHAR(DATE_PART(EPOCH_SECOND, MAX(COALESCE(UPDATED_AT, CREATED_AT)))) AS WATERMARK FROM TICKETS"
        );
        assert_eq!(
            query.to_sql(&WarehouseKind::Postgres),
            "SELECT CAST(CAST(FLOOR(EXTRACT(EPOCH FROM MAX(COALESCE(UPDATED_AT, CREATED_AT)))) AS BIGINT) AS TEXT) AS WATERMARK FROM TICKETS"
        );
    }

    #[test]
    fn never_formats_wall_clock_text() {
        for kind in [WarehouseKind::Snowflake, WarehouseKind::Postgres] {
            let sql = WatermarkQuery::default().to_sql(&kind);
            assert!(!sql.contains("TO_CHAR("), "{sql}");
            assert!(!sql.contains("\"Z\""), "{sql}");
        }
    }

    #[test]
    fn quotes_unusual_identifiers() {
        let query = WatermarkQuery {
            table: "RAW.HELPDESK.My Tickets".into(),
            ..Default::default()
        };
        assert!(query.to_sql(&WarehouseKind::Postgres).ends_with(r#"FROM RAW.HELPDESK."My Tickets""#));
    }
}
