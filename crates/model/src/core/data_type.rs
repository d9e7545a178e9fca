use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a normalized column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    /// Array payload, staged as compact JSON text.
    List,
    /// Nested object; expands into one column per leaf.
    Object,
    /// Undeclared value whose type was inferred from the payload.
    Json,
    Null,
}

impl DataType {
    /// Whether values of this type occupy a single column.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, DataType::Object)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Text => "text",
            DataType::Boolean => "boolean",
            DataType::Timestamp => "timestamp",
            DataType::List => "list",
            DataType::Object => "object",
            DataType::Json => "json",
            DataType::Null => "null",
        };
        f.write_str(name)
    }
}
