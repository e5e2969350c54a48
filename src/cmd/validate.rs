use std::fs::File;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::error::ValidateError;
use crate::domain::report::{ValidationResponse, ValidationStatus};
use crate::domain::rule::RuleDescriptor;
use crate::engine::{aggregate, notify, schema, validate};
use crate::io::{self, reader};
use crate::util::time::rfc3339_utc_now;

/// Input arguments for validate command execution API.
#[derive(Debug, Clone)]
pub struct ValidateCommandArgs {
    pub input: PathBuf,
    pub rules: PathBuf,
    pub emit_notification: bool,
}

/// Structured command response that carries exit-code mapping, the JSON
/// payload, and the optional notification payload for the boundary.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidateCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
    pub notification: Option<Value>,
}

/// Ordered pipeline-step names used for `--emit-pipeline` diagnostics.
pub fn pipeline_steps() -> Vec<String> {
    vec![
        "validate_load_rules".to_string(),
        "validate_load_dataset".to_string(),
        "validate_execute_rules".to_string(),
        "validate_aggregate_report".to_string(),
    ]
}

/// Determinism guards applied by `validate`.
pub fn deterministic_guards() -> Vec<String> {
    vec![
        "validate_exit_mapping_0_2_3_1".to_string(),
        "validate_result_order_matches_rule_order".to_string(),
        "validate_sample_first_n_not_random".to_string(),
        "validate_record_weighted_summary".to_string(),
    ]
}

pub fn run(args: &ValidateCommandArgs) -> ValidateCommandResponse {
    match execute(args) {
        Ok(response) => response,
        Err(error) => {
            let exit_code = match error {
                ValidateError::SerializeReport { .. } => 1,
                _ => 3,
            };
            let kind = if exit_code == 1 {
                "internal_error"
            } else {
                "input_usage_error"
            };
            ValidateCommandResponse {
                exit_code,
                payload: json!({
                    "error": kind,
                    "message": error.to_string(),
                }),
                notification: None,
            }
        }
    }
}

fn execute(args: &ValidateCommandArgs) -> Result<ValidateCommandResponse, ValidateError> {
    let rules = load_rules(args)?;
    let validator =
        validate::for_path(&args.input).map_err(|source| ValidateError::LoadDataset {
            path: args.input.display().to_string(),
            source,
        })?;

    let results = validator.validate_rules(&rules);
    let report = aggregate::aggregate(results);
    let status = report.summary.status;

    let dataset = dataset_name(args);
    let notification = args
        .emit_notification
        .then(|| notify::notification_payload(&dataset, &report.summary, &report.results));

    let response = ValidationResponse::new(dataset, rfc3339_utc_now(), report);
    let payload = serde_json::to_value(&response)
        .map_err(|source| ValidateError::SerializeReport { source })?;

    let exit_code = match status {
        ValidationStatus::Passed => 0,
        ValidationStatus::Failed | ValidationStatus::Imperfect => 2,
    };
    Ok(ValidateCommandResponse {
        exit_code,
        payload,
        notification,
    })
}

fn load_rules(args: &ValidateCommandArgs) -> Result<Vec<RuleDescriptor>, ValidateError> {
    let format = io::rules_format_from_path(&args.rules)
        .map_err(|source| ValidateError::ResolveRules { source })?;
    let file = File::open(&args.rules).map_err(|source| ValidateError::OpenRules {
        path: args.rules.display().to_string(),
        source,
    })?;
    let document = reader::read_rules_document(file, format)
        .map_err(|source| ValidateError::ReadRules { format, source })?;
    schema::parse_rules_document(&document)
        .map_err(|error| ValidateError::InvalidRules(error.to_string()))
}

fn dataset_name(args: &ValidateCommandArgs) -> String {
    args.input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input.display().to_string())
}
