use thiserror::Error;

use crate::io::{Format, IoError};

/// Errors produced by the `validate` command boundary. Only these are fatal
/// to a run; per-rule trouble degrades into rule results instead.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The dataset file could not be resolved, opened, or parsed.
    #[error("failed to load dataset `{path}`: {source}")]
    LoadDataset {
        path: String,
        #[source]
        source: IoError,
    },

    /// The rules format could not be resolved from the file extension.
    #[error("failed to resolve rules format: {source}")]
    ResolveRules {
        #[source]
        source: IoError,
    },

    /// The rules file could not be opened.
    #[error("failed to open rules file `{path}`: {source}")]
    OpenRules {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The rules file could not be parsed in the resolved format.
    #[error("failed to read {format} rules: {source}")]
    ReadRules {
        format: Format,
        #[source]
        source: IoError,
    },

    /// The rules document does not satisfy the rules schema.
    #[error("invalid rules document: {0}")]
    InvalidRules(String),

    /// The finished report could not be serialized.
    #[error("failed to serialize validation report: {source}")]
    SerializeReport {
        #[source]
        source: serde_json::Error,
    },
}
