use super::{FieldSpec, ResourceSchema};
use crate::core::data_type::DataType::{self, *};

const fn f(name: &'static str, data_type: DataType) -> FieldSpec {
    FieldSpec::new(name, data_type)
}

const FIELDS: &[FieldSpec] = &[
    f("id", Integer),
    f("workspace_id", Integer),
    f("name", Text),
    f("label", Text),
    f("label_for_requesters", Text),
    f("description", Text),
    f("field_type", Text),
    f("position", Integer),
    f("default_field", Boolean),
    f("required", Boolean),
    f("required_for_closure", Boolean),
    f("required_for_agents", Boolean),
    f("required_for_customers", Boolean),
    f("displayed_to_customers", Boolean),
    f("customers_can_edit", Boolean),
    f("portal_cc", Boolean),
    f("portalcc_to", Text),
    f("belongs_to_section", Boolean),
    f("choices", List),
    f("nested_fields", List),
    f("sections", List),
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
