use serde_json::{Value, json};

use crate::domain::report::{RuleResult, ValidationSummary};

/// Most failed-rule detail lines included in a notification.
const FAILED_RULE_LINES: usize = 5;

/// Builds the chat-ops notification payload for a finished run. Pure;
/// delivery belongs to the boundary that owns the webhook.
pub fn notification_payload(
    dataset: &str,
    summary: &ValidationSummary,
    results: &[RuleResult],
) -> Value {
    let status_text = if summary.failed_rules == 0 {
        "VALIDATION PASSED"
    } else {
        "VALIDATION FAILED"
    };

    let failed_rules: Vec<Value> = results
        .iter()
        .filter(|result| !result.passed)
        .take(FAILED_RULE_LINES)
        .map(|result| {
            json!({
                "rule": result.rule_name,
                "detail": failed_rule_detail(result),
            })
        })
        .collect();

    json!({
        "text": format!("Data Quality Validation Report for {dataset}"),
        "status": status_text,
        "summary": {
            "total_rules": summary.total_rules,
            "passed_rules": summary.passed_rules,
            "failed_rules": summary.failed_rules,
            "overall_success_rate": summary.overall_success_rate,
        },
        "failed_rules": failed_rules,
    })
}

fn failed_rule_detail(result: &RuleResult) -> String {
    if result.failed_records > 0 {
        format!(
            "{}/{} records failed",
            result.failed_records, result.total_records
        )
    } else {
        result
            .error_message
            .clone()
            .unwrap_or_else(|| "Validation failed".to_string())
    }
}
