//! Dataset model and loading
//!
//! A dataset is an ordered sequence of records. Records are immutable once
//! loaded and are identified by their position in the sequence. A dataset
//! that cannot be fully parsed is a fatal error for the run: there is no
//! well-defined partial result without a valid record set.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EvalError, EvalResult};

/// JSON object map used for record and task metadata
pub type JsonMap = serde_json::Map<String, Value>;

/// One input/expected/metadata triple driving one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Input handed to the task
    pub input: Value,

    /// Reference value scorers may compare the output against
    #[serde(default)]
    pub expected: Option<Value>,

    /// Arbitrary metadata attached to the record
    #[serde(default)]
    pub metadata: JsonMap,
}

impl DatasetRecord {
    /// Create a record with just an input
    pub fn new(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            expected: None,
            metadata: JsonMap::new(),
        }
    }

    /// Set the expected value
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An ordered, read-only sequence of dataset records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<DatasetRecord>,
}

impl Dataset {
    /// Create a dataset from records
    pub fn new(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    /// Parse a dataset from a JSON array of record objects
    ///
    /// Each element must match the [`DatasetRecord`] schema; the first
    /// malformed element aborts the load with its index.
    pub fn from_values(values: Vec<Value>) -> EvalResult<Self> {
        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let record: DatasetRecord = serde_json::from_value(value)
                .map_err(|source| EvalError::MalformedRecord { index, source })?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Parse a dataset from a JSON document (must be a top-level array)
    pub fn from_json_str(json: &str) -> EvalResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| EvalError::InvalidDataset(e.to_string()))?;
        match value {
            Value::Array(values) => Self::from_values(values),
            other => Err(EvalError::InvalidDataset(format!(
                "expected a JSON array of records, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Load a dataset from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> EvalResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| EvalError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records
    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Consume the dataset into its records
    pub fn into_records(self) -> Vec<DatasetRecord> {
        self.records
    }

    /// Iterate over the records
    pub fn iter(&self) -> std::slice::Iter<'_, DatasetRecord> {
        self.records.iter()
    }
}

impl From<Vec<DatasetRecord>> for Dataset {
    fn from(records: Vec<DatasetRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<DatasetRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = DatasetRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_builder() {
        let record = DatasetRecord::new("foo")
            .with_expected("foo")
            .with_metadata("next", "bar");

        assert_eq!(record.input, json!("foo"));
        assert_eq!(record.expected, Some(json!("foo")));
        assert_eq!(record.metadata.get("next"), Some(&json!("bar")));
    }

    #[test]
    fn test_from_json_str() {
        let dataset = Dataset::from_json_str(
            r#"[
                {"input": "foo", "expected": "foo", "metadata": {"next": "bar"}},
                {"input": "bar", "expected": "bar"}
            ]"#,
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].metadata.get("next"), Some(&json!("bar")));
        assert_eq!(dataset.records()[1].expected, Some(json!("bar")));
        assert!(dataset.records()[1].metadata.is_empty());
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let err = Dataset::from_values(vec![
            json!({"input": "ok"}),
            json!("not an object"),
        ])
        .unwrap_err();

        match err {
            EvalError::MalformedRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_array_document_rejected() {
        let err = Dataset::from_json_str(r#"{"input": "foo"}"#).unwrap_err();
        assert!(matches!(err, EvalError::InvalidDataset(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, r#"[{"input": 1, "expected": 2}]"#).unwrap();

        let dataset = Dataset::from_json_file(&path).unwrap();
        assert_eq!(dataset.len(), 1);

        let err = Dataset::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, EvalError::DatasetIo { .. }));
    }
}
