use model::core::{data_type::DataType, utils::parse_timestamp, value::Value};
use serde_json::Value as JsonValue;

/// Converts a JSON value to the declared type. `None` means the value does
/// not fit; JSON null always fits.
pub fn coerce(value: &JsonValue, data_type: DataType) -> Option<Value> {
    if value.is_null() {
        return Some(Value::Null);
    }

    match data_type {
        DataType::Integer => as_integer(value).map(Value::Int),
        DataType::Float => match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .map(Value::Float),
        DataType::Text => match value {
            JsonValue::String(s) => Some(Value::String(s.clone())),
            JsonValue::Number(n) => Some(Value::String(n.to_string())),
            JsonValue::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        DataType::Boolean => match value {
            JsonValue::Bool(b) => Some(Value::Boolean(*b)),
            JsonValue::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Boolean(true)),
            JsonValue::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Boolean(false)),
            _ => None,
        },
        DataType::Timestamp => match value {
            JsonValue::String(s) => parse_timestamp(s).map(Value::Timestamp),
            _ => None,
        },
        DataType::List => match value {
            JsonValue::Array(_) => Some(Value::Json(value.clone())),
            _ => None,
        },
        DataType::Json | DataType::Object | DataType::Null => Some(Value::infer(value)),
    }
}

fn as_integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_compatible_values() {
        assert_eq!(coerce(&json!(7), DataType::Integer), Some(Value::Int(7)));
        assert_eq!(coerce(&json!("7"), DataType::Integer), Some(Value::Int(7)));
        assert_eq!(coerce(&json!(7.0), DataType::Integer), Some(Value::Int(7)));
        assert_eq!(coerce(&json!(2), DataType::Text), Some(Value::String("2".into())));
        assert_eq!(coerce(&json!("TRUE"), DataType::Boolean), Some(Value::Boolean(true)));
        assert_eq!(coerce(&json!(null), DataType::Timestamp), Some(Value::Null));
        assert!(matches!(
            coerce(&json!("2024-03-01T10:00:00Z"), DataType::Timestamp),
            Some(Value::Timestamp(_))
        ));
    }

    #[test]
    fn rejects_mismatches() {
        assert_eq!(coerce(&json!("seven"), DataType::Integer), None);
        assert_eq!(coerce(&json!(7.5), DataType::Integer), None);
        assert_eq!(coerce(&json!({"a": 1}), DataType::Text), None);
        assert_eq!(coerce(&json!("a@x.io"), DataType::List), None);
        assert_eq!(coerce(&json!("soon"), DataType::Timestamp), None);
    }
}
