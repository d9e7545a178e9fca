use crate::{core::utils::parse_timestamp, resource::ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One helpdesk entity as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub resource: ResourceKind,
    /// Page the record was fetched from (1-based).
    pub page: u32,
    pub data: serde_json::Value,
}

impl Record {
    pub fn new(resource: ResourceKind, page: u32, data: serde_json::Value) -> Self {
        Record {
            resource,
            page,
            data,
        }
    }

    /// The identifier, if present and non-null.
    pub fn id(&self) -> Option<&serde_json::Value> {
        let field = self.resource.schema().id_field;
        self.data.get(field).filter(|v| !v.is_null())
    }

    /// Last modification time: the updated timestamp, falling back to the
    /// created timestamp.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let schema = self.resource.schema();
        [schema.updated_field, schema.created_field]
            .into_iter()
            .flatten()
            .find_map(|field| {
                self.data
                    .get(field)
                    .and_then(|v| v.as_str())
                    .and_then(parse_timestamp)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn modified_at_falls_back_to_created_at() {
        let record = Record::new(
            ResourceKind::Tickets,
            1,
            json!({"id": 7, "updated_at": null, "created_at": "2024-02-01T10:00:00Z"}),
        );
        let expected = Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap();
        assert_eq!(record.modified_at(), Some(expected));
    }

    #[test]
    fn null_id_is_missing() {
        let record = Record::new(ResourceKind::AgentGroups, 1, json!({"id": null}));
        assert!(record.id().is_none());
    }
}
