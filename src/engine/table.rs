use serde_json::{Map, Value};

use crate::io::IoError;

static NULL: Value = Value::Null;

/// In-memory tabular projection of one loaded dataset. Columns keep
/// first-seen order and are unique by construction; the row count is fixed
/// for the duration of a validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl Table {
    /// Builds a table from object records, collecting columns in first-seen
    /// order across all records.
    pub fn from_values(values: Vec<Value>) -> Result<Self, IoError> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let Value::Object(map) = value else {
                return Err(IoError::RecordNotObject { index });
            };
            for key in map.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
            rows.push(map);
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Values of one column in row order; cells missing in a record read as
    /// null.
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        self.rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&NULL))
            .collect()
    }
}
