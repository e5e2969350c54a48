use std::io::Read;

use crate::domain::report::RuleResult;
use crate::domain::rule::{self, RuleDescriptor};
use crate::engine::checks::{self, CheckKind};
use crate::engine::clean::clean_result;
use crate::engine::sample::failed_records_sample;
use crate::engine::table::Table;
use crate::io::IoError;
use crate::io::format::csv;

use super::{error_result, result_from_evaluation};

/// Validator for flat tabular datasets: one scalar per cell, one evaluation
/// row per record.
#[derive(Debug)]
pub struct TabularValidator {
    table: Table,
}

impl TabularValidator {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IoError> {
        let values = csv::read_csv(reader)?;
        Ok(Self::new(Table::from_values(values)?))
    }

    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn record_count(&self) -> usize {
        self.table.record_count()
    }

    /// Executes every rule in order, isolating failures per rule.
    pub fn validate_rules(&self, rules: &[RuleDescriptor]) -> Vec<RuleResult> {
        rules
            .iter()
            .map(|descriptor| clean_result(self.execute_rule(descriptor)))
            .collect()
    }

    fn execute_rule(&self, descriptor: &RuleDescriptor) -> RuleResult {
        let columns = rule::target_columns(&descriptor.check_spec.parameters);
        let outcome = CheckKind::parse(&descriptor.check_spec.check_type)
            .and_then(|kind| checks::compile(kind, &descriptor.check_spec.parameters))
            .and_then(|compiled| checks::evaluate_table(&compiled, &self.table));
        match outcome {
            Ok(evaluation) => {
                let sample = if evaluation.failed_records > 0 {
                    failed_records_sample(&evaluation, self.table.rows(), &columns)
                } else {
                    None
                };
                result_from_evaluation(descriptor, columns, &evaluation, sample)
            }
            Err(error) => error_result(
                descriptor,
                columns,
                self.table.record_count(),
                format!("Exception during validation: {error}"),
            ),
        }
    }
}
