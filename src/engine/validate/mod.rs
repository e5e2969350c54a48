pub mod nested;
pub mod tabular;

use std::fs::File;
use std::path::Path;

use serde_json::{Map, Value};

use crate::domain::report::RuleResult;
use crate::domain::rule::RuleDescriptor;
use crate::engine::checks::CheckEvaluation;
use crate::io::{self, Format, IoError};

pub use nested::NestedValidator;
pub use tabular::TabularValidator;

/// A validator bound to one loaded dataset. Constructed per run; never
/// reused across datasets or concurrent requests.
#[derive(Debug)]
pub enum DatasetValidator {
    Tabular(TabularValidator),
    Nested(NestedValidator),
}

impl DatasetValidator {
    /// Executes every rule in order; one rule's failure never aborts the
    /// others. Result order matches rule order.
    pub fn validate_rules(&self, rules: &[RuleDescriptor]) -> Vec<RuleResult> {
        match self {
            Self::Tabular(validator) => validator.validate_rules(rules),
            Self::Nested(validator) => validator.validate_rules(rules),
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            Self::Tabular(validator) => validator.record_count(),
            Self::Nested(validator) => validator.record_count(),
        }
    }
}

/// Loads the dataset at `path` once and selects the matching validator by
/// file extension. Any failure here is fatal to the whole run.
pub fn for_path(path: &Path) -> Result<DatasetValidator, IoError> {
    let format = io::dataset_format_from_path(path)?;
    let file = File::open(path)?;
    match format {
        Format::Csv => Ok(DatasetValidator::Tabular(TabularValidator::from_reader(
            file,
        )?)),
        // the dataset resolver only yields csv or json
        _ => Ok(DatasetValidator::Nested(NestedValidator::from_reader(
            file,
        )?)),
    }
}

/// Builds the result for a successfully evaluated rule, applying the
/// pass/fail and success-rate invariants.
pub(crate) fn result_from_evaluation(
    descriptor: &RuleDescriptor,
    columns: Vec<String>,
    evaluation: &CheckEvaluation,
    sample: Option<Vec<Map<String, Value>>>,
) -> RuleResult {
    let total = evaluation.total_records;
    let failed = evaluation.failed_records;
    let passed = failed == 0 && total > 0;
    let success_rate = if total > 0 {
        100.0 * (total - failed) as f64 / total as f64
    } else {
        0.0
    };
    let error_message = if passed {
        None
    } else {
        Some(failure_message(&descriptor.check_spec.check_type, evaluation))
    };
    RuleResult {
        rule_name: descriptor.name.clone(),
        natural_language_rule: descriptor.natural_language_rule.clone(),
        passed,
        check_type: descriptor.check_spec.check_type.clone(),
        parameters: descriptor.check_spec.parameters.clone(),
        columns,
        total_records: total,
        failed_records: failed,
        success_rate,
        error_message,
        failed_records_sample: sample,
    }
}

fn failure_message(check_type: &str, evaluation: &CheckEvaluation) -> String {
    if evaluation.total_records == 0 {
        return format!("Validation failed: No records to validate for {check_type}");
    }
    let mut message = format!(
        "Validation failed: {} of {} records failed {check_type}",
        evaluation.failed_records, evaluation.total_records
    );
    if let Some(note) = &evaluation.note {
        message.push_str(&format!(" ({note})"));
    }
    message
}

/// Worst-case result for a rule whose evaluation errored: every record
/// counts as failed and the message carries the error text.
pub(crate) fn error_result(
    descriptor: &RuleDescriptor,
    columns: Vec<String>,
    record_count: usize,
    message: String,
) -> RuleResult {
    RuleResult {
        rule_name: descriptor.name.clone(),
        natural_language_rule: descriptor.natural_language_rule.clone(),
        passed: false,
        check_type: descriptor.check_spec.check_type.clone(),
        parameters: descriptor.check_spec.parameters.clone(),
        columns,
        total_records: record_count,
        failed_records: record_count,
        success_rate: 0.0,
        error_message: Some(message),
        failed_records_sample: None,
    }
}
