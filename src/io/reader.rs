use std::io::Read;

use serde_json::Value;

use crate::io::format::{json, yaml};
use crate::io::{Format, IoError};

/// Reads a rules document in the resolved format as one JSON value.
pub fn read_rules_document<R: Read>(reader: R, format: Format) -> Result<Value, IoError> {
    match format {
        Format::Json => json::read_document(reader),
        Format::Yaml => yaml::read_document(reader),
        Format::Csv => Err(IoError::UnsupportedFormat {
            format: Format::Csv.as_str().to_string(),
        }),
    }
}
