use serde_json::{Value, json};

use crate::engine::checks::{CheckKind, SUPPORTED_CHECKS};

/// Deterministic JSON payload describing the supported check vocabulary,
/// for rule-producer tooling and interactive discovery.
pub fn checks_help_payload() -> Value {
    let checks: Vec<Value> = SUPPORTED_CHECKS
        .iter()
        .map(|kind| {
            json!({
                "check_type": kind.as_str(),
                "scope": scope(*kind),
                "parameters": parameters_help(*kind),
            })
        })
        .collect();
    json!({
        "supported_checks": checks,
        "count": SUPPORTED_CHECKS.len(),
    })
}

fn scope(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::NotNull
        | CheckKind::ValueInSet
        | CheckKind::ValueBetween
        | CheckKind::MatchesRegex
        | CheckKind::MatchesDatetimeFormat
        | CheckKind::TypeOf
        | CheckKind::ValueLengthBetween => "row",
        CheckKind::Unique
        | CheckKind::MeanBetween
        | CheckKind::MedianBetween
        | CheckKind::MinBetween
        | CheckKind::MaxBetween => "column",
        CheckKind::ColumnCountEquals | CheckKind::ColumnsMatchOrderedList => "table",
    }
}

fn parameters_help(kind: CheckKind) -> Value {
    match kind {
        CheckKind::NotNull => json!({"column": "string"}),
        CheckKind::ValueInSet => json!({"column": "string", "value_set": "array"}),
        CheckKind::ValueBetween => {
            json!({"column": "string", "min": "number (optional)", "max": "number (optional)"})
        }
        CheckKind::MatchesRegex => json!({"column": "string", "regex": "string"}),
        CheckKind::MatchesDatetimeFormat => json!({"column": "string", "format": "string"}),
        CheckKind::TypeOf => json!({
            "column": "string",
            "value_type": "string|number|integer|boolean|array|object|null"
        }),
        CheckKind::ValueLengthBetween => {
            json!({"column": "string", "min": "integer (optional)", "max": "integer (optional)"})
        }
        CheckKind::Unique => json!({"column": "string"}),
        CheckKind::MeanBetween
        | CheckKind::MedianBetween
        | CheckKind::MinBetween
        | CheckKind::MaxBetween => {
            json!({"column": "string", "min": "number (optional)", "max": "number (optional)"})
        }
        CheckKind::ColumnCountEquals => json!({"value": "integer"}),
        CheckKind::ColumnsMatchOrderedList => json!({"column_list": "array of strings"}),
    }
}
