use std::io::Read;

use serde_json::Value;

use crate::io::IoError;

/// Reads a JSON dataset: the document must be an array of records.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Value>, IoError> {
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(IoError::DatasetNotArray),
    }
}

/// Reads a JSON rules document as a single value.
pub fn read_document<R: Read>(reader: R) -> Result<Value, IoError> {
    Ok(serde_json::from_reader(reader)?)
}
