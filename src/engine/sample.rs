use serde_json::{Map, Value};

use crate::engine::checks::CheckEvaluation;

/// Most records ever returned in a failure sample.
pub const SAMPLE_LIMIT: usize = 5;

/// Extracts up to [`SAMPLE_LIMIT`] representative failing records from an
/// evaluation. Priority order: failing record indices (complete, then
/// partial), failing values wrapped as `{column: value}` records (complete,
/// then partial), and finally up to 5 non-null values of the first target
/// column as illustrative context. Returns `None` when nothing can be
/// produced; never errors.
pub fn failed_records_sample(
    evaluation: &CheckEvaluation,
    records: &[Map<String, Value>],
    columns: &[String],
) -> Option<Vec<Map<String, Value>>> {
    if !evaluation.failed_indices.is_empty() {
        let sample = records_at(records, &evaluation.failed_indices);
        if !sample.is_empty() {
            return Some(sample);
        }
    }

    if !evaluation.failed_values.is_empty() {
        let sample: Vec<Map<String, Value>> = evaluation
            .failed_values
            .iter()
            .take(SAMPLE_LIMIT)
            .filter_map(|value| wrap_value(value, columns.first().map(String::as_str)))
            .collect();
        if !sample.is_empty() {
            return Some(sample);
        }
    }

    let column = columns.first()?;
    let sample: Vec<Map<String, Value>> = records
        .iter()
        .filter_map(|record| record.get(column))
        .filter(|value| !value.is_null())
        .take(SAMPLE_LIMIT)
        .map(|value| {
            let mut wrapped = Map::new();
            wrapped.insert(column.clone(), value.clone());
            wrapped
        })
        .collect();
    if sample.is_empty() { None } else { Some(sample) }
}

fn records_at(records: &[Map<String, Value>], indices: &[usize]) -> Vec<Map<String, Value>> {
    indices
        .iter()
        .take(SAMPLE_LIMIT)
        .filter_map(|&index| records.get(index).cloned())
        .collect()
}

fn wrap_value(value: &Value, column: Option<&str>) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert(column?.to_string(), other.clone());
            Some(wrapped)
        }
    }
}
