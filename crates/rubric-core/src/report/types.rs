//! Report data structures

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dataset::{DatasetRecord, JsonMap};
use crate::scorer::Score;

/// Outcome of one record's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Task completed and scorers ran
    Scored,
    /// Task raised; no output, no scores
    TaskFailed,
    /// Task exceeded the configured timeout
    TimedOut,
    /// Evaluation was cancelled while this record was in flight
    Cancelled,
}

impl RecordStatus {
    /// Whether the record produced a scoreable output
    pub fn is_scored(&self) -> bool {
        matches!(self, RecordStatus::Scored)
    }
}

/// One scorer's failure on one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerFailure {
    /// Scorer name
    pub scorer: String,
    /// Error message
    pub message: String,
}

/// Result entry for one dataset record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordReport {
    /// Position of the record in the dataset sequence
    pub index: usize,

    /// The record that was evaluated
    pub record: DatasetRecord,

    /// Task output; `None` when the task failed
    pub output: Option<Value>,

    /// Metadata snapshot after the task ran (seeded from the record's)
    #[serde(default)]
    pub metadata: JsonMap,

    /// Scores from every scorer that succeeded
    #[serde(default)]
    pub scores: Vec<Score>,

    /// Execution outcome
    pub status: RecordStatus,

    /// Task error message, if the task failed
    pub error: Option<String>,

    /// Scorers that failed on this record
    #[serde(default)]
    pub scorer_failures: Vec<ScorerFailure>,

    /// Wall-clock time spent on this record
    pub duration_secs: f64,
}

impl RecordReport {
    /// A score by name, if present
    pub fn score(&self, name: &str) -> Option<&Score> {
        self.scores.iter().find(|s| s.name == name)
    }
}

/// Summary statistics for one score name across the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerSummary {
    /// Number of records that produced this score
    pub count: u32,

    /// Mean value
    pub mean: f64,

    /// Minimum value
    pub min: f64,

    /// Maximum value
    pub max: f64,
}

/// Run-level summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total records in the dataset
    pub total_records: u32,

    /// Records that completed and were scored
    pub scored_records: u32,

    /// Records whose task failed, timed out, or was cancelled
    pub failed_records: u32,

    /// Statistics keyed by score name
    pub by_scorer: BTreeMap<String, ScorerSummary>,
}

/// Full result of an evaluation run
///
/// Entries are in dataset order, one per record, regardless of completion
/// order. A record whose task failed is present but scoreless, so
/// consumers can compute success rates over the full dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Unique id for this run
    pub run_id: Uuid,

    /// Optional experiment name
    pub experiment: Option<String>,

    /// Per-record entries in dataset order
    pub entries: Vec<RecordReport>,

    /// Run-level summary
    pub summary: ReportSummary,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total wall-clock time for the run
    pub total_duration_secs: f64,
}

impl EvalReport {
    /// Fraction of records that completed and were scored
    pub fn success_rate(&self) -> f64 {
        if self.summary.total_records == 0 {
            return 0.0;
        }
        self.summary.scored_records as f64 / self.summary.total_records as f64
    }

    /// Mean value for a score name, if any record produced it
    pub fn mean_score(&self, name: &str) -> Option<f64> {
        self.summary.by_scorer.get(name).map(|s| s.mean)
    }
}
