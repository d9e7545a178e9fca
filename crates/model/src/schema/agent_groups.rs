use super::{FieldSpec, ResourceSchema};
use crate::core::data_type::DataType::{self, *};

const fn f(name: &'static str, data_type: DataType) -> FieldSpec {
    FieldSpec::new(name, data_type)
}

const FIELDS: &[FieldSpec] = &[
    f("id", Integer),
    f("workspace_id", Integer),
    f("name", Text),
    f("description", Text),
    f("escalate_to", Integer),
    f("unassigned_for", Text),
    f("business_hours_id", Integer),
    f("group_type", Text),
    f("restricted", Boolean),
    f("approval_required", Boolean),
    f("auto_ticket_assign", Boolean),
    f("ocs_schedule_id", Integer),
    f("agent_ids", List),
    f("members", List),
    f("observers", List),
    f("leaders", List),
    f("created_at", Timestamp),
    f("updated_at", Timestamp),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    id_field: "id",
    updated_field: Some("updated_at"),
    created_field: Some("created_at"),
    fields: FIELDS,
    renames: &[],
};
