use jsonschema::validator_for;
use serde_json::Value;
use thiserror::Error;

use crate::domain::rule::RuleDescriptor;

/// Schema every rules document must satisfy before any rule executes.
const RULES_DOCUMENT_SCHEMA: &str = r#"{
    "type": "array",
    "items": {
        "type": "object",
        "required": ["name", "check_spec"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "description": {"type": "string"},
            "natural_language_rule": {"type": "string"},
            "type": {"type": "string"},
            "check_spec": {
                "type": "object",
                "required": ["check_type"],
                "properties": {
                    "check_type": {"type": "string", "minLength": 1},
                    "parameters": {"type": "object"}
                },
                "additionalProperties": false
            }
        }
    }
}"#;

#[derive(Debug, Error)]
pub enum RulesDocumentError {
    #[error("rules document must be an array of rules or an object with a `rules` array")]
    UnexpectedShape,

    #[error("rules document does not match the rules schema: {details}")]
    SchemaMismatch { details: String },

    #[error("failed to decode rules: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Validates a rules document against the embedded schema and decodes it.
/// Accepts a bare array of rules or an object carrying a `rules` array.
pub fn parse_rules_document(document: &Value) -> Result<Vec<RuleDescriptor>, RulesDocumentError> {
    let rules = match document {
        Value::Array(_) => document.clone(),
        Value::Object(map) => match map.get("rules") {
            Some(rules @ Value::Array(_)) => rules.clone(),
            _ => return Err(RulesDocumentError::UnexpectedShape),
        },
        _ => return Err(RulesDocumentError::UnexpectedShape),
    };

    let schema: Value = serde_json::from_str(RULES_DOCUMENT_SCHEMA)?;
    let validator = validator_for(&schema).map_err(|error| RulesDocumentError::SchemaMismatch {
        details: error.to_string(),
    })?;

    let mut mismatches: Vec<String> = validator
        .iter_errors(&rules)
        .map(|error| format!("{}: {error}", pointer_path(error.instance_path().as_str())))
        .collect();
    if !mismatches.is_empty() {
        mismatches.sort();
        return Err(RulesDocumentError::SchemaMismatch {
            details: mismatches.join("; "),
        });
    }

    Ok(serde_json::from_value(rules)?)
}

fn pointer_path(pointer: &str) -> String {
    if pointer.is_empty() {
        return "$".to_string();
    }
    let mut path = String::from("$");
    for token in pointer.trim_start_matches('/').split('/') {
        if token.chars().all(|ch| ch.is_ascii_digit()) {
            path.push('[');
            path.push_str(token);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(token);
        }
    }
    path
}
