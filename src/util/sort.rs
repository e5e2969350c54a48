use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Rebuilds a value with all object keys sorted, recursively. Used to build
/// stable signatures for uniqueness comparison.
pub fn sort_value_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let mut out = Map::new();
            for (key, child) in sorted {
                out.insert(key.clone(), sort_value_keys(child));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value_keys).collect()),
        _ => value.clone(),
    }
}
