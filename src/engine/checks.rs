use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::engine::table::Table;
use crate::util::sort::sort_value_keys;
use crate::util::time::matches_strftime;

/// Upper bound on stored per-failure detail; counts stay exact beyond it.
pub const DETAIL_LIMIT: usize = 100;

/// Closed vocabulary of supported checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    NotNull,
    ValueInSet,
    ValueBetween,
    MatchesRegex,
    MatchesDatetimeFormat,
    TypeOf,
    ValueLengthBetween,
    Unique,
    MeanBetween,
    MedianBetween,
    MinBetween,
    MaxBetween,
    ColumnCountEquals,
    ColumnsMatchOrderedList,
}

pub const SUPPORTED_CHECKS: [CheckKind; 14] = [
    CheckKind::NotNull,
    CheckKind::ValueInSet,
    CheckKind::ValueBetween,
    CheckKind::MatchesRegex,
    CheckKind::MatchesDatetimeFormat,
    CheckKind::TypeOf,
    CheckKind::ValueLengthBetween,
    CheckKind::Unique,
    CheckKind::MeanBetween,
    CheckKind::MedianBetween,
    CheckKind::MinBetween,
    CheckKind::MaxBetween,
    CheckKind::ColumnCountEquals,
    CheckKind::ColumnsMatchOrderedList,
];

impl CheckKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotNull => "not-null",
            Self::ValueInSet => "value-in-set",
            Self::ValueBetween => "value-between",
            Self::MatchesRegex => "matches-regex",
            Self::MatchesDatetimeFormat => "matches-datetime-format",
            Self::TypeOf => "type-of",
            Self::ValueLengthBetween => "value-length-between",
            Self::Unique => "unique",
            Self::MeanBetween => "mean-between",
            Self::MedianBetween => "median-between",
            Self::MinBetween => "min-between",
            Self::MaxBetween => "max-between",
            Self::ColumnCountEquals => "column-count-equals",
            Self::ColumnsMatchOrderedList => "columns-match-ordered-list",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CheckError> {
        SUPPORTED_CHECKS
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| CheckError::UnsupportedCheckType {
                check_type: raw.to_string(),
                supported: supported_check_names().join(", "),
            })
    }
}

pub fn supported_check_names() -> Vec<&'static str> {
    SUPPORTED_CHECKS.iter().map(|kind| kind.as_str()).collect()
}

/// Per-rule evaluation errors; always local to the offending rule.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Unsupported check type `{check_type}`. Supported checks: {supported}")]
    UnsupportedCheckType {
        check_type: String,
        supported: String,
    },

    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("invalid parameters for {check}: {reason}")]
    BadParameter { check: &'static str, reason: String },
}

impl CheckError {
    fn bad_parameter(kind: CheckKind, reason: impl Into<String>) -> Self {
        Self::BadParameter {
            check: kind.as_str(),
            reason: reason.into(),
        }
    }
}

/// Expected JSON value type for the `type-of` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

const VALUE_TYPE_NAMES: [&str; 7] =
    ["string", "number", "integer", "boolean", "array", "object", "null"];

impl ValueType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Null => value.is_null(),
        }
    }
}

/// Inclusive numeric bounds; comparisons are exact across i64/u64/f64.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericBounds {
    pub min: Option<Number>,
    pub max: Option<Number>,
}

impl NumericBounds {
    pub fn contains(&self, value: &Number) -> bool {
        if let Some(min) = &self.min
            && compare_numbers(value, min) == Ordering::Less
        {
            return false;
        }
        if let Some(max) = &self.max
            && compare_numbers(value, max) == Ordering::Greater
        {
            return false;
        }
        true
    }

    pub fn contains_f64(&self, value: f64) -> bool {
        if let Some(min) = &self.min
            && value < min.as_f64().unwrap_or(f64::NEG_INFINITY)
        {
            return false;
        }
        if let Some(max) = &self.max
            && value > max.as_f64().unwrap_or(f64::INFINITY)
        {
            return false;
        }
        true
    }
}

/// Column aggregate targeted by a statistical bound check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateStat {
    Mean,
    Median,
    Min,
    Max,
}

impl AggregateStat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Predicate applied to one cell value. Null values are skipped by every
/// predicate except `NotNull`.
#[derive(Debug)]
pub enum ValuePredicate {
    NotNull,
    InSet { allowed: Vec<Value> },
    Between { bounds: NumericBounds },
    Regex { pattern: Regex },
    DatetimeFormat { format: String },
    TypeOf { expected: ValueType },
    LengthBetween { min: Option<u64>, max: Option<u64> },
}

impl ValuePredicate {
    pub fn violates(&self, value: &Value) -> bool {
        if value.is_null() {
            return matches!(self, Self::NotNull);
        }
        match self {
            Self::NotNull => false,
            Self::InSet { allowed } => !allowed.iter().any(|member| values_equal(member, value)),
            Self::Between { bounds } => match value {
                Value::Number(number) => !bounds.contains(number),
                _ => true,
            },
            Self::Regex { pattern } => match value {
                Value::String(text) => !pattern.is_match(text),
                _ => true,
            },
            Self::DatetimeFormat { format } => match value {
                Value::String(text) => !matches_strftime(text, format),
                _ => true,
            },
            Self::TypeOf { expected } => !expected.matches(value),
            Self::LengthBetween { min, max } => match value_length(value) {
                Some(length) => {
                    min.is_some_and(|bound| length < bound)
                        || max.is_some_and(|bound| length > bound)
                }
                None => true,
            },
        }
    }
}

/// A check compiled against its parameters, ready to run over a column or
/// the table as a whole.
#[derive(Debug)]
pub enum CompiledCheck {
    PerValue {
        column: String,
        predicate: ValuePredicate,
    },
    Unique {
        column: String,
    },
    Aggregate {
        column: String,
        stat: AggregateStat,
        bounds: NumericBounds,
    },
    ColumnCountEquals {
        expected: usize,
    },
    ColumnsMatchOrderedList {
        expected: Vec<String>,
    },
}

impl CompiledCheck {
    /// The column a per-column check targets, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::PerValue { column, .. }
            | Self::Unique { column }
            | Self::Aggregate { column, .. } => Some(column),
            Self::ColumnCountEquals { .. } | Self::ColumnsMatchOrderedList { .. } => None,
        }
    }
}

/// Validates parameters once and compiles the check for evaluation.
pub fn compile(kind: CheckKind, parameters: &Map<String, Value>) -> Result<CompiledCheck, CheckError> {
    match kind {
        CheckKind::NotNull => Ok(CompiledCheck::PerValue {
            column: require_column(kind, parameters)?,
            predicate: ValuePredicate::NotNull,
        }),
        CheckKind::ValueInSet => {
            let column = require_column(kind, parameters)?;
            let allowed = match parameters.get("value_set") {
                Some(Value::Array(items)) if !items.is_empty() => items.clone(),
                Some(Value::Array(_)) => {
                    return Err(CheckError::bad_parameter(kind, "`value_set` must not be empty"));
                }
                _ => {
                    return Err(CheckError::bad_parameter(
                        kind,
                        "missing array parameter `value_set`",
                    ));
                }
            };
            Ok(CompiledCheck::PerValue {
                column,
                predicate: ValuePredicate::InSet { allowed },
            })
        }
        CheckKind::ValueBetween => Ok(CompiledCheck::PerValue {
            column: require_column(kind, parameters)?,
            predicate: ValuePredicate::Between {
                bounds: numeric_bounds(kind, parameters)?,
            },
        }),
        CheckKind::MatchesRegex => {
            let column = require_column(kind, parameters)?;
            let raw = require_string(kind, parameters, "regex")?;
            let pattern = Regex::new(&raw).map_err(|error| {
                CheckError::bad_parameter(kind, format!("invalid `regex`: {error}"))
            })?;
            Ok(CompiledCheck::PerValue {
                column,
                predicate: ValuePredicate::Regex { pattern },
            })
        }
        CheckKind::MatchesDatetimeFormat => {
            let column = require_column(kind, parameters)?;
            let format = require_string(kind, parameters, "format")?;
            Ok(CompiledCheck::PerValue {
                column,
                predicate: ValuePredicate::DatetimeFormat { format },
            })
        }
        CheckKind::TypeOf => {
            let column = require_column(kind, parameters)?;
            let raw = require_string(kind, parameters, "value_type")?;
            let expected = ValueType::parse(&raw).ok_or_else(|| {
                CheckError::bad_parameter(
                    kind,
                    format!(
                        "unknown `value_type` `{raw}`; expected one of: {}",
                        VALUE_TYPE_NAMES.join(", ")
                    ),
                )
            })?;
            Ok(CompiledCheck::PerValue {
                column,
                predicate: ValuePredicate::TypeOf { expected },
            })
        }
        CheckKind::ValueLengthBetween => {
            let column = require_column(kind, parameters)?;
            let (min, max) = length_bounds(kind, parameters)?;
            Ok(CompiledCheck::PerValue {
                column,
                predicate: ValuePredicate::LengthBetween { min, max },
            })
        }
        CheckKind::Unique => Ok(CompiledCheck::Unique {
            column: require_column(kind, parameters)?,
        }),
        CheckKind::MeanBetween => compile_aggregate(kind, parameters, AggregateStat::Mean),
        CheckKind::MedianBetween => compile_aggregate(kind, parameters, AggregateStat::Median),
        CheckKind::MinBetween => compile_aggregate(kind, parameters, AggregateStat::Min),
        CheckKind::MaxBetween => compile_aggregate(kind, parameters, AggregateStat::Max),
        CheckKind::ColumnCountEquals => {
            let expected = parameters
                .get("value")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    CheckError::bad_parameter(
                        kind,
                        "missing non-negative integer parameter `value`",
                    )
                })?;
            Ok(CompiledCheck::ColumnCountEquals {
                expected: expected as usize,
            })
        }
        CheckKind::ColumnsMatchOrderedList => {
            let Some(Value::Array(items)) = parameters.get("column_list") else {
                return Err(CheckError::bad_parameter(
                    kind,
                    "missing array parameter `column_list`",
                ));
            };
            let expected = items
                .iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name.clone()),
                    _ => Err(CheckError::bad_parameter(
                        kind,
                        "`column_list` entries must be strings",
                    )),
                })
                .collect::<Result<Vec<String>, CheckError>>()?;
            Ok(CompiledCheck::ColumnsMatchOrderedList { expected })
        }
    }
}

fn compile_aggregate(
    kind: CheckKind,
    parameters: &Map<String, Value>,
    stat: AggregateStat,
) -> Result<CompiledCheck, CheckError> {
    Ok(CompiledCheck::Aggregate {
        column: require_column(kind, parameters)?,
        stat,
        bounds: numeric_bounds(kind, parameters)?,
    })
}

fn require_column(kind: CheckKind, parameters: &Map<String, Value>) -> Result<String, CheckError> {
    match parameters.get("column") {
        Some(Value::String(name)) if !name.is_empty() => Ok(name.clone()),
        _ => Err(CheckError::bad_parameter(
            kind,
            "missing string parameter `column`",
        )),
    }
}

fn require_string(
    kind: CheckKind,
    parameters: &Map<String, Value>,
    key: &str,
) -> Result<String, CheckError> {
    match parameters.get(key) {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.clone()),
        _ => Err(CheckError::bad_parameter(
            kind,
            format!("missing string parameter `{key}`"),
        )),
    }
}

fn numeric_bounds(
    kind: CheckKind,
    parameters: &Map<String, Value>,
) -> Result<NumericBounds, CheckError> {
    let min = optional_number(kind, parameters, "min")?;
    let max = optional_number(kind, parameters, "max")?;
    if min.is_none() && max.is_none() {
        return Err(CheckError::bad_parameter(
            kind,
            "at least one of `min`/`max` is required",
        ));
    }
    if let (Some(min), Some(max)) = (&min, &max)
        && compare_numbers(min, max) == Ordering::Greater
    {
        return Err(CheckError::bad_parameter(kind, "`min` must be <= `max`"));
    }
    Ok(NumericBounds { min, max })
}

fn optional_number(
    kind: CheckKind,
    parameters: &Map<String, Value>,
    key: &str,
) -> Result<Option<Number>, CheckError> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(Some(number.clone())),
        Some(_) => Err(CheckError::bad_parameter(
            kind,
            format!("parameter `{key}` must be a number"),
        )),
    }
}

fn length_bounds(
    kind: CheckKind,
    parameters: &Map<String, Value>,
) -> Result<(Option<u64>, Option<u64>), CheckError> {
    let min = optional_length(kind, parameters, "min")?;
    let max = optional_length(kind, parameters, "max")?;
    if min.is_none() && max.is_none() {
        return Err(CheckError::bad_parameter(
            kind,
            "at least one of `min`/`max` is required",
        ));
    }
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(CheckError::bad_parameter(kind, "`min` must be <= `max`"));
    }
    Ok((min, max))
}

fn optional_length(
    kind: CheckKind,
    parameters: &Map<String, Value>,
    key: &str,
) -> Result<Option<u64>, CheckError> {
    match parameters.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            CheckError::bad_parameter(
                kind,
                format!("parameter `{key}` must be a non-negative integer"),
            )
        }),
    }
}

/// Structured outcome of one check evaluation. Counts are exact; index and
/// value detail is capped at [`DETAIL_LIMIT`] with completeness flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckEvaluation {
    pub total_records: usize,
    pub failed_records: usize,
    pub failed_indices: Vec<usize>,
    pub indices_complete: bool,
    pub failed_values: Vec<Value>,
    pub values_complete: bool,
    pub note: Option<String>,
}

impl CheckEvaluation {
    fn table_level(expected_ok: bool, note: String) -> Self {
        Self {
            total_records: 1,
            failed_records: usize::from(!expected_ok),
            failed_indices: Vec::new(),
            indices_complete: expected_ok,
            failed_values: Vec::new(),
            values_complete: expected_ok,
            note: Some(note),
        }
    }
}

/// Runs a compiled check over the table.
pub fn evaluate_table(
    compiled: &CompiledCheck,
    table: &Table,
) -> Result<CheckEvaluation, CheckError> {
    if let Some(column) = compiled.column()
        && !table.has_column(column)
    {
        return Err(CheckError::ColumnNotFound {
            column: column.to_string(),
            available: table.columns().to_vec(),
        });
    }
    match compiled {
        CompiledCheck::PerValue { column, predicate } => {
            Ok(evaluate_per_value(predicate, &table.column_values(column)))
        }
        CompiledCheck::Unique { column } => Ok(evaluate_unique(&table.column_values(column))),
        CompiledCheck::Aggregate {
            column,
            stat,
            bounds,
        } => Ok(evaluate_aggregate(*stat, bounds, &table.column_values(column))),
        CompiledCheck::ColumnCountEquals { expected } => {
            let actual = table.columns().len();
            Ok(CheckEvaluation::table_level(
                actual == *expected,
                format!("expected {expected} columns, found {actual}"),
            ))
        }
        CompiledCheck::ColumnsMatchOrderedList { expected } => {
            let actual = table.columns();
            Ok(CheckEvaluation::table_level(
                actual == expected.as_slice(),
                format!("expected columns {expected:?}, found {actual:?}"),
            ))
        }
    }
}

/// Applies a per-value predicate across a value sequence.
pub fn evaluate_per_value(predicate: &ValuePredicate, values: &[&Value]) -> CheckEvaluation {
    let mut failed = 0usize;
    let mut failed_indices = Vec::new();
    let mut failed_values = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if predicate.violates(value) {
            failed += 1;
            if failed_indices.len() < DETAIL_LIMIT {
                failed_indices.push(index);
            }
            if failed_values.len() < DETAIL_LIMIT {
                failed_values.push((*value).clone());
            }
        }
    }
    CheckEvaluation {
        total_records: values.len(),
        failed_records: failed,
        indices_complete: failed_indices.len() == failed,
        values_complete: failed_values.len() == failed,
        failed_indices,
        failed_values,
        note: None,
    }
}

/// Flags positions whose non-null value occurs more than once. Null values
/// never count as duplicates.
pub fn duplicated_value_flags(values: &[&Value]) -> Vec<bool> {
    let signatures: Vec<Option<String>> = values
        .iter()
        .map(|value| {
            if value.is_null() {
                None
            } else {
                Some(value_signature(value))
            }
        })
        .collect();
    let mut occurrences: BTreeMap<&String, usize> = BTreeMap::new();
    for signature in signatures.iter().flatten() {
        *occurrences.entry(signature).or_default() += 1;
    }
    signatures
        .iter()
        .map(|signature| {
            signature
                .as_ref()
                .is_some_and(|sig| occurrences.get(sig).copied().unwrap_or(0) > 1)
        })
        .collect()
}

/// Flags every non-null value that occurs more than once in the sequence.
pub fn evaluate_unique(values: &[&Value]) -> CheckEvaluation {
    let duplicated = duplicated_value_flags(values);
    let mut failed = 0usize;
    let mut failed_indices = Vec::new();
    let mut failed_values = Vec::new();
    for (index, duplicated) in duplicated.into_iter().enumerate() {
        if duplicated {
            failed += 1;
            if failed_indices.len() < DETAIL_LIMIT {
                failed_indices.push(index);
            }
            if failed_values.len() < DETAIL_LIMIT {
                failed_values.push(values[index].clone());
            }
        }
    }
    CheckEvaluation {
        total_records: values.len(),
        failed_records: failed,
        indices_complete: failed_indices.len() == failed,
        values_complete: failed_values.len() == failed,
        failed_indices,
        failed_values,
        note: None,
    }
}

/// Evaluates a statistical bound over the non-null numeric values of a
/// column. The scope is the count of values considered; a violated bound
/// fails the whole scope. No per-row detail exists, so sampling falls
/// through to illustrative column values.
pub fn evaluate_aggregate(
    stat: AggregateStat,
    bounds: &NumericBounds,
    values: &[&Value],
) -> CheckEvaluation {
    let numbers: Vec<f64> = values.iter().filter_map(|value| value.as_f64()).collect();
    let total = numbers.len();
    if total == 0 {
        return CheckEvaluation {
            total_records: 0,
            failed_records: 0,
            failed_indices: Vec::new(),
            indices_complete: true,
            failed_values: Vec::new(),
            values_complete: true,
            note: Some(format!("no numeric values to compute {}", stat.as_str())),
        };
    }
    let observed = match stat {
        AggregateStat::Mean => numbers.iter().sum::<f64>() / total as f64,
        AggregateStat::Median => median(numbers.clone()),
        AggregateStat::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateStat::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    let within = bounds.contains_f64(observed);
    CheckEvaluation {
        total_records: total,
        failed_records: if within { 0 } else { total },
        failed_indices: Vec::new(),
        indices_complete: within,
        failed_values: Vec::new(),
        values_complete: within,
        note: Some(format!("observed {} {observed}", stat.as_str())),
    }
}

fn median(mut numbers: Vec<f64>) -> f64 {
    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 0 {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    } else {
        numbers[mid]
    }
}

fn value_length(value: &Value) -> Option<u64> {
    match value {
        Value::String(text) => Some(text.chars().count() as u64),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

fn value_signature(value: &Value) -> String {
    serde_json::to_string(&sort_value_keys(value))
        .unwrap_or_else(|_| "<unserializable>".to_string())
}

/// Deep equality with numeric comparison by value, so 1 == 1.0.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Ordering::Equal,
        _ => left == right,
    }
}

fn compare_numbers(left: &Number, right: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_u64()) {
        return if a < 0 {
            Ordering::Less
        } else {
            (a as u64).cmp(&b)
        };
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_i64()) {
        return if b < 0 {
            Ordering::Greater
        } else {
            a.cmp(&(b as u64))
        };
    }
    let a = left.as_f64().unwrap_or(f64::NAN);
    let b = right.as_f64().unwrap_or(f64::NAN);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
