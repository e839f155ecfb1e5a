//! Result aggregation
//!
//! Pure merge of per-record results into an [`EvalReport`]. No scores are
//! recomputed here; the aggregator only restores dataset order and
//! derives summary statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::{EvalReport, RecordReport, ReportSummary, ScorerSummary};

/// Aggregator merging record results into a report
pub struct ReportAggregator {
    experiment: Option<String>,
    started_at: DateTime<Utc>,
}

impl ReportAggregator {
    /// Create an aggregator for a run that started at `started_at`
    pub fn new(experiment: Option<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            experiment,
            started_at,
        }
    }

    /// Merge record results into a report
    ///
    /// `entries` may arrive in completion order; they are slotted back
    /// into dataset order by index.
    pub fn aggregate(&self, mut entries: Vec<RecordReport>, total_duration_secs: f64) -> EvalReport {
        entries.sort_unstable_by_key(|e| e.index);

        let summary = Self::summarize(&entries);

        EvalReport {
            run_id: Uuid::new_v4(),
            experiment: self.experiment.clone(),
            entries,
            summary,
            started_at: self.started_at,
            total_duration_secs,
        }
    }

    fn summarize(entries: &[RecordReport]) -> ReportSummary {
        let total_records = entries.len() as u32;
        let scored_records = entries.iter().filter(|e| e.status.is_scored()).count() as u32;

        let mut by_scorer: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for entry in entries {
            for score in &entry.scores {
                by_scorer.entry(score.name.clone()).or_default().push(score.value);
            }
        }

        let by_scorer = by_scorer
            .into_iter()
            .map(|(name, values)| {
                let count = values.len() as u32;
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                (name, ScorerSummary { count, mean, min, max })
            })
            .collect();

        ReportSummary {
            total_records,
            scored_records,
            failed_records: total_records - scored_records,
            by_scorer,
        }
    }
}
