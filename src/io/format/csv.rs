use std::io::Read;

use serde_json::{Map, Number, Value};

use crate::io::IoError;

/// Reads CSV into object records, inferring a scalar type per cell: empty
/// cells become null, `true`/`false` become booleans, integers and finite
/// floats become numbers, everything else stays a string. Non-finite floats
/// (NaN, inf) become null so records stay JSON-safe.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Value>, IoError> {
    let mut csv_reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut out = Vec::new();
    for row in csv_reader.records() {
        let record = row?;
        let mut map = Map::new();
        for (index, cell) in record.iter().enumerate() {
            let key = headers
                .get(index)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| format!("col_{index}"));
            map.insert(key, infer_cell(cell));
        }
        out.push(Value::Object(map));
    }
    Ok(out)
}

fn infer_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match cell {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(integer) = cell.parse::<i64>() {
        return Value::Number(Number::from(integer));
    }
    if let Ok(float) = cell.parse::<f64>() {
        return Number::from_f64(float)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    Value::String(cell.to_string())
}
