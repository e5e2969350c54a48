use serde_json::{Map, Number, Value};

use crate::domain::report::RuleResult;

/// Converts a float into a JSON-safe value; NaN and infinities become null.
pub fn json_safe_f64(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Recursively rebuilds a value so every nested map and array is freshly
/// allocated and ordered as encountered. Scalars pass through unchanged;
/// non-finite floats cannot occur inside a `Value` and are mapped to null at
/// ingestion via [`json_safe_f64`].
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                out.insert(key.clone(), sanitize_value(child));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Round-trip guard: a result that cannot be serialized is reduced to a
/// minimal safe result that keeps every scalar field, drops the failure
/// sample, and carries an explicit serialization-error message. The
/// aggregator therefore never receives a result that cannot cross the
/// process boundary.
pub fn clean_result(result: RuleResult) -> RuleResult {
    match serde_json::to_string(&result) {
        Ok(_) => result,
        Err(_) => minimal_safe_result(result),
    }
}

fn minimal_safe_result(result: RuleResult) -> RuleResult {
    let error_message = match result.error_message {
        Some(existing) => format!("{existing}; Serialization error: failed records sample omitted"),
        None => "Serialization error: failed records sample omitted".to_string(),
    };
    RuleResult {
        failed_records_sample: None,
        error_message: Some(error_message),
        ..result
    }
}
