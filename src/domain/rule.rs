use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One validation rule as authored by a user or produced by the rule
/// generator. Immutable once handed to a validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub natural_language_rule: String,
    pub check_spec: CheckSpec,
    #[serde(rename = "type", default)]
    pub category: String,
}

/// Structured check description: a check name plus its parameter map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSpec {
    pub check_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Parameter keys that may carry target column names.
const COLUMN_PARAMETER_KEYS: [&str; 5] =
    ["column", "columns", "column_A", "column_B", "column_list"];

/// Collects the target column names referenced by check parameters,
/// deduplicated in first-seen order. Checks without an explicit column
/// yield an empty list.
pub fn target_columns(parameters: &Map<String, Value>) -> Vec<String> {
    let mut out = Vec::new();
    for key in COLUMN_PARAMETER_KEYS {
        match parameters.get(key) {
            Some(Value::String(name)) => push_unique(&mut out, name),
            Some(Value::Array(items)) => {
                for item in items {
                    if let Value::String(name) = item {
                        push_unique(&mut out, name);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_unique(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|existing| existing == name) {
        out.push(name.to_string());
    }
}
