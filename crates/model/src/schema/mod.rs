//! Declared shape of each helpdesk resource.
//!
//! Records arrive as loosely-typed JSON. The schema names the fields a
//! resource is expected to carry and their types, so that the normalizer can
//! emit the same columns in the same order for every record of a run, coerce
//! scalars, and null out anything that does not fit.

use crate::core::{data_type::DataType, utils::normalize_col_name};

pub mod agent_groups;
pub mod ticket_fields;
pub mod tickets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Top-level JSON key.
    pub name: &'static str,
    pub data_type: DataType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, data_type: DataType) -> Self {
        FieldSpec { name, data_type }
    }

    /// Column name this field is staged under.
    pub fn column(&self) -> String {
        normalize_col_name(self.name)
    }
}

/// Column rename applied after flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameRule {
    Exact { from: &'static str, to: &'static str },
    /// Drops a leading namespace, e.g. `CUSTOM_FIELDS_REGION` -> `REGION`.
    StripPrefix(&'static str),
}

impl RenameRule {
    /// Returns the renamed column, or `None` if the rule does not apply.
    pub fn apply(&self, column: &str) -> Option<String> {
        match self {
            RenameRule::Exact { from, to } if column == *from => Some(to.to_string()),
            RenameRule::Exact { .. } => None,
            RenameRule::StripPrefix(prefix) => column
                .strip_prefix(prefix)
                .filter(|rest| !rest.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug)]
pub struct ResourceSchema {
    /// Field holding the unique record identifier.
    pub id_field: &'static str,
    pub updated_field: Option<&'static str>,
    pub created_field: Option<&'static str>,
    pub fields: &'static [FieldSpec],
    pub renames: &'static [RenameRule],
}

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared single-value columns in schema order.
    pub fn declared_columns(&self) -> Vec<(String, DataType)> {
        self.fields
            .iter()
            .filter(|f| f.data_type.is_scalar())
            .map(|f| (f.column(), f.data_type))
            .collect()
    }

    /// Applies the first matching rename rule.
    pub fn rename(&self, column: &str) -> Option<String> {
        self.renames.iter().find_map(|rule| rule.apply(column))
    }
}
