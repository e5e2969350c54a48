pub mod error;
pub mod format;
pub mod reader;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Yaml,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(IoError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Resolves a dataset format from the file extension. Datasets are CSV or
/// JSON only; anything else is an unsupported-format load failure.
pub fn dataset_format_from_path(path: &Path) -> Result<Format, IoError> {
    match format_from_path(path) {
        Some(Format::Csv) => Ok(Format::Csv),
        Some(Format::Json) => Ok(Format::Json),
        _ => Err(IoError::UnsupportedPathExtension {
            kind: "dataset",
            path: path.to_string_lossy().into_owned(),
        }),
    }
}

/// Resolves a rules-document format from the file extension. Rules documents
/// are JSON or YAML.
pub fn rules_format_from_path(path: &Path) -> Result<Format, IoError> {
    match format_from_path(path) {
        Some(Format::Json) => Ok(Format::Json),
        Some(Format::Yaml) => Ok(Format::Yaml),
        _ => Err(IoError::UnsupportedPathExtension {
            kind: "rules",
            path: path.to_string_lossy().into_owned(),
        }),
    }
}

fn format_from_path(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(Format::Csv),
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}
