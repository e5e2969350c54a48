use std::collections::BTreeSet;
use std::io::Read;

use serde_json::{Map, Value};

use crate::domain::report::RuleResult;
use crate::domain::rule::{self, RuleDescriptor};
use crate::engine::checks::{
    self, CheckError, CheckEvaluation, CheckKind, CompiledCheck, DETAIL_LIMIT,
};
use crate::engine::clean::clean_result;
use crate::engine::sample::failed_records_sample;
use crate::engine::table::Table;
use crate::io::IoError;
use crate::io::format::json;

use super::{error_result, result_from_evaluation};

/// Validator for hierarchical JSON datasets. Nested objects flatten into
/// dotted column paths for the tabular projection; array-valued fields are
/// expanded per element at evaluation time, with failures aggregated back
/// to distinct original records. The unflattened records are retained for
/// failure sampling.
#[derive(Debug)]
pub struct NestedValidator {
    records: Vec<Map<String, Value>>,
    table: Table,
}

impl NestedValidator {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IoError> {
        Self::new(json::read_json(reader)?)
    }

    pub fn new(values: Vec<Value>) -> Result<Self, IoError> {
        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let Value::Object(map) = value else {
                return Err(IoError::RecordNotObject { index });
            };
            records.push(map);
        }
        let flattened = records
            .iter()
            .map(|record| Value::Object(flatten_record(record)))
            .collect();
        let table = Table::from_values(flattened)?;
        Ok(Self { records, table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
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
            .and_then(|compiled| self.evaluate(&compiled));
        match outcome {
            Ok(evaluation) => {
                let sample = if evaluation.failed_records > 0 {
                    failed_records_sample(&evaluation, &self.records, &columns)
                } else {
                    None
                };
                result_from_evaluation(descriptor, columns, &evaluation, sample)
            }
            Err(error) => error_result(
                descriptor,
                columns,
                self.records.len(),
                format!("Exception during validation: {error}"),
            ),
        }
    }

    fn evaluate(&self, compiled: &CompiledCheck) -> Result<CheckEvaluation, CheckError> {
        let Some(column) = compiled.column() else {
            return checks::evaluate_table(compiled, &self.table);
        };
        if !self.table.has_column(column) {
            return Err(CheckError::ColumnNotFound {
                column: column.to_string(),
                available: self.table.columns().to_vec(),
            });
        }
        if !self.column_has_arrays(column) {
            return checks::evaluate_table(compiled, &self.table);
        }

        let exploded = self.explode_column(column);
        match compiled {
            CompiledCheck::PerValue { predicate, .. } => {
                let violations = exploded
                    .iter()
                    .map(|(_, value)| predicate.violates(value));
                Ok(self.aggregate_elements(&exploded, violations.collect()))
            }
            CompiledCheck::Unique { .. } => {
                let element_values: Vec<&Value> =
                    exploded.iter().map(|(_, value)| value).collect();
                let violations = checks::duplicated_value_flags(&element_values);
                Ok(self.aggregate_elements(&exploded, violations))
            }
            CompiledCheck::Aggregate { stat, bounds, .. } => {
                let element_values: Vec<&Value> =
                    exploded.iter().map(|(_, value)| value).collect();
                Ok(checks::evaluate_aggregate(*stat, bounds, &element_values))
            }
            // table-level checks carry no column and were handled above
            other => checks::evaluate_table(other, &self.table),
        }
    }

    fn column_has_arrays(&self, column: &str) -> bool {
        self.table
            .column_values(column)
            .iter()
            .any(|value| value.is_array())
    }

    /// One evaluation row per array element, tagged with the owning
    /// record's position. Empty arrays contribute a single null; non-array
    /// values pass through unchanged.
    fn explode_column(&self, column: &str) -> Vec<(usize, Value)> {
        let mut out = Vec::new();
        for (record_id, value) in self.table.column_values(column).into_iter().enumerate() {
            match value {
                Value::Array(items) if items.is_empty() => out.push((record_id, Value::Null)),
                Value::Array(items) => {
                    for item in items {
                        out.push((record_id, item.clone()));
                    }
                }
                other => out.push((record_id, other.clone())),
            }
        }
        out
    }

    /// Folds element-level violations back to the original record level: a
    /// record fails if any of its elements fails, and counts exactly once.
    fn aggregate_elements(
        &self,
        exploded: &[(usize, Value)],
        violations: Vec<bool>,
    ) -> CheckEvaluation {
        let mut failed_ids = BTreeSet::new();
        let mut failed_values = Vec::new();
        let mut failed_elements = 0usize;
        for ((record_id, value), violates) in exploded.iter().zip(violations) {
            if violates {
                failed_elements += 1;
                failed_ids.insert(*record_id);
                if failed_values.len() < DETAIL_LIMIT {
                    failed_values.push(value.clone());
                }
            }
        }
        let failed_records = failed_ids.len();
        let failed_indices: Vec<usize> = failed_ids.into_iter().take(DETAIL_LIMIT).collect();
        CheckEvaluation {
            total_records: self.records.len(),
            failed_records,
            indices_complete: failed_indices.len() == failed_records,
            values_complete: failed_values.len() == failed_elements,
            failed_indices,
            failed_values,
            note: None,
        }
    }
}

/// Flattens nested objects into dotted column paths; arrays and scalars are
/// kept whole.
fn flatten_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into(record, None, &mut out);
    out
}

fn flatten_into(record: &Map<String, Value>, prefix: Option<&str>, out: &mut Map<String, Value>) {
    for (key, value) in record {
        let column = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&column), out),
            other => {
                out.insert(column, other.clone());
            }
        }
    }
}
