use crate::domain::report::{RuleResult, ValidationReport, ValidationStatus, ValidationSummary};

/// Rolls per-rule results into the dataset-level summary. Pure computation
/// over finalized results; an empty input is a valid run that passed.
pub fn summarize(results: &[RuleResult]) -> ValidationSummary {
    let total_rules = results.len();
    let passed_rules = results.iter().filter(|result| result.passed).count();
    let failed_rules = total_rules - passed_rules;
    let total_records_processed: usize = results.iter().map(|result| result.total_records).sum();
    let total_failed_records: usize = results.iter().map(|result| result.failed_records).sum();

    // record-weighted, not averaged per rule
    let overall_success_rate = if total_records_processed > 0 {
        100.0 * (total_records_processed - total_failed_records) as f64
            / total_records_processed as f64
    } else {
        0.0
    };

    let status = if failed_rules == 0 {
        ValidationStatus::Passed
    } else if passed_rules == 0 {
        ValidationStatus::Failed
    } else {
        ValidationStatus::Imperfect
    };

    ValidationSummary {
        total_rules,
        passed_rules,
        failed_rules,
        total_records_processed,
        total_failed_records,
        overall_success_rate,
        status,
    }
}

/// Combines ordered rule results into the full report.
pub fn aggregate(results: Vec<RuleResult>) -> ValidationReport {
    ValidationReport {
        summary: summarize(&results),
        results,
    }
}
