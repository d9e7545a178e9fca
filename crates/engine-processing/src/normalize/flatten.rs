use crate::normalize::coerce::coerce;
use model::{
    core::{data_type::DataType, utils::normalize_col_name, value::Value},
    schema::ResourceSchema,
};
use serde_json::{Map, Value as JsonValue};

/// One value produced by flattening a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: String,
    /// Dotted JSON path the value came from, e.g. `custom_fields.region`.
    pub source: String,
    pub value: Value,
    pub data_type: DataType,
}

#[derive(Debug, Default)]
pub struct Flattened {
    pub cells: Vec<Cell>,
    /// Declared columns whose value did not fit the declared type.
    pub mismatches: Vec<String>,
}

/// Flattens one record. Declared scalar fields are coerced; everything else
/// is expanded, nested objects becoming `PARENT_CHILD` columns and arrays
/// staying whole as JSON.
pub fn flatten_record(schema: &ResourceSchema, object: &Map<String, JsonValue>) -> Flattened {
    let mut out = Flattened::default();

    for (key, value) in object {
        match schema.field(key) {
            Some(spec) if spec.data_type.is_scalar() => {
                let column = spec.column();
                let value = coerce(value, spec.data_type).unwrap_or_else(|| {
                    out.mismatches.push(column.clone());
                    Value::Null
                });
                out.cells.push(Cell {
                    column,
                    source: key.clone(),
                    value,
                    data_type: spec.data_type,
                });
            }
            // A declared object that is absent contributes no columns.
            Some(_) if value.is_null() => {}
            _ => expand(key.clone(), value, &mut out.cells),
        }
    }

    out
}

/// Separators in the path become `_` in the column name, so distinct paths
/// such as `a.b_c` and `a.b c` can land on the same column.
fn expand(path: String, value: &JsonValue, cells: &mut Vec<Cell>) {
    match value {
        JsonValue::Object(children) => {
            for (key, child) in children {
                expand(format!("{path}.{key}"), child, cells);
            }
        }
        other => {
            let value = Value::infer(other);
            cells.push(Cell {
                column: normalize_col_name(&path),
                source: path,
                data_type: value.data_type(),
                value,
            });
        }
    }
}
