use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one rule against one dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleResult {
    pub rule_name: String,
    pub natural_language_rule: String,
    pub passed: bool,
    pub check_type: String,
    pub parameters: Map<String, Value>,
    pub columns: Vec<String>,
    pub total_records: usize,
    pub failed_records: usize,
    pub success_rate: f64,
    pub error_message: Option<String>,
    pub failed_records_sample: Option<Vec<Map<String, Value>>>,
}

/// Overall status derived from per-rule outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationStatus {
    Passed,
    Failed,
    Imperfect,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Imperfect => "Imperfect",
        }
    }
}

/// Dataset-level rollup of rule results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSummary {
    pub total_rules: usize,
    pub passed_rules: usize,
    pub failed_rules: usize,
    pub total_records_processed: usize,
    pub total_failed_records: usize,
    pub overall_success_rate: f64,
    pub status: ValidationStatus,
}

/// Full report for one validation run; result order preserves rule order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub results: Vec<RuleResult>,
}

/// Boundary envelope around a report, mirroring the stored validation
/// payload shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResponse {
    pub dataset: String,
    pub validation_timestamp: String,
    pub summary: ValidationSummary,
    pub results: Vec<RuleResult>,
}

impl ValidationResponse {
    pub fn new(dataset: impl Into<String>, timestamp: impl Into<String>, report: ValidationReport) -> Self {
        Self {
            dataset: dataset.into(),
            validation_timestamp: timestamp.into(),
            summary: report.summary,
            results: report.results,
        }
    }
}

/// Diagnostics report emitted when `--emit-pipeline` is enabled.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PipelineReport {
    pub command: String,
    pub input: PipelineInput,
    pub steps: Vec<String>,
    pub deterministic_guards: Vec<String>,
}

impl PipelineReport {
    pub fn new(
        command: impl Into<String>,
        input: PipelineInput,
        steps: Vec<String>,
        deterministic_guards: Vec<String>,
    ) -> Self {
        Self {
            command: command.into(),
            input,
            steps,
            deterministic_guards,
        }
    }
}

/// Input-source descriptors used in pipeline diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PipelineInput {
    pub sources: Vec<PipelineInputSource>,
}

impl PipelineInput {
    pub fn new(sources: Vec<PipelineInputSource>) -> Self {
        Self { sources }
    }
}

/// Single input source descriptor.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PipelineInputSource {
    pub label: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl PipelineInputSource {
    pub fn path(label: impl Into<String>, path: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            format: format.map(ToOwned::to_owned),
        }
    }
}
