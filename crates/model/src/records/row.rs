use crate::{
    core::value::{FieldValue, Value},
    resource::ResourceKind,
};
use serde::{Deserialize, Serialize};

/// Flat, fixed-schema representation of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub resource: ResourceKind,
    pub field_values: Vec<FieldValue>,
}

impl NormalizedRow {
    pub fn new(resource: ResourceKind, field_values: Vec<FieldValue>) -> Self {
        NormalizedRow {
            resource,
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }
}
