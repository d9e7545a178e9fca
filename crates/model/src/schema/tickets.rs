use super::{FieldSpec, RenameRule, ResourceSchema};
use crate::core::data_type::DataType::{self, *};

const fn f(name: &'static str, data_type: DataType) -> FieldSpec {
    FieldSpec::new(name, data_type)
}

const FIELDS: &[FieldSpec] = &[
    f("id", Integer),
    f("workspace_id", Integer),
    f("subject", Text),
    f("description", Text),
    f("description_text", Text),
    f("type", Text),
    f("status", Integer),
    f("priority", Integer),
    f("source", Integer),
    f("urgency", Integer),
    f("impact", Integer),
    f("category", Text),
    f("sub_category", Text),
    f("item_category", Text),
    f("group_id", Integer),
    f("department_id", Integer),
    f("requester_id", Integer),
    f("requested_for_id", Integer),
    f("responder_id", Integer),
    f("email_config_id", Integer),
    f("sla_policy_id", Integer),
    f("applied_business_hours", Integer),
    f("created_within_business_hours", Boolean),
    f("approval_status", Integer),
    f("approval_status_name", Text),
    f("fr_escalated", Boolean),
    f("is_escalated", Boolean),
    f("deleted", Boolean),
    f("spam", Boolean),
    f("due_by", Timestamp),
    f("fr_due_by", Timestamp),
    f("cc_emails", List),
    f("fwd_emails", List),
    f("reply_cc_emails", List),
    f("to_emails", List),
    f("tasks_dependency_type", Integer),
    f("resolution_notes", Text),
    f("resolution_notes_html", Text),
    f("created_at", Timestamp),
    f("updated_at", Timestamp),
    f("custom_fields", Object),
];

pub static SCHEMA: ResourceSchema = ResourceSchema {
    id_field: "id",
    updated_field: Some("updated_at"),
    created_field: Some("created_at"),
    fields: FIELDS,
    renames: &[RenameRule::StripPrefix("CUSTOM_FIELDS_")],
};
