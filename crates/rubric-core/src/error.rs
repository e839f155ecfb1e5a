//! Error types for the evaluation harness
//!
//! Task and scorer failures are recovered per record and surfaced as
//! structured absence in the report; only errors that leave the run
//! without a well-defined result (bad dataset, unwritable report) are
//! returned through `EvalError`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for harness operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Fatal errors for an evaluation run
#[derive(Debug, Error)]
pub enum EvalError {
    /// The dataset source could not be read
    #[error("failed to read dataset file {path}")]
    DatasetIo {
        /// Path of the dataset file
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset contained a record that does not match the record schema
    #[error("malformed dataset record at index {index}")]
    MalformedRecord {
        /// Position of the offending record in the dataset sequence
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The dataset document itself was not valid JSON or not an array
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Report serialization failed
    #[error("failed to serialize report")]
    Serialize(#[from] serde_json::Error),

    /// The report could not be written out
    #[error("failed to write report to {path}")]
    ReportIo {
        /// Destination path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::InvalidDataset("expected a JSON array".to_string());
        assert_eq!(err.to_string(), "invalid dataset: expected a JSON array");
    }

    #[test]
    fn test_malformed_record_carries_index() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = EvalError::MalformedRecord { index: 3, source };
        assert!(err.to_string().contains("index 3"));
    }
}
