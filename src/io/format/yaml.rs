use std::io::Read;

use serde_json::Value;

use crate::io::IoError;

/// Reads a YAML rules document as a single JSON value.
pub fn read_document<R: Read>(reader: R) -> Result<Value, IoError> {
    Ok(serde_yaml::from_reader(reader)?)
}
