//! Markdown report generation

use super::types::{EvalReport, RecordStatus};

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(report: &EvalReport) -> String {
        let mut md = String::new();

        md.push_str("# Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Run**: {}\n", report.run_id));
        if let Some(experiment) = &report.experiment {
            md.push_str(&format!("- **Experiment**: {}\n", experiment));
        }
        md.push_str(&format!(
            "- **Started**: {}\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!(
            "- **Duration**: {:.1}s\n",
            report.total_duration_secs
        ));
        md.push_str(&format!(
            "- **Records**: {} ({} scored, {} failed)\n\n",
            report.summary.total_records,
            report.summary.scored_records,
            report.summary.failed_records
        ));

        md.push_str("## Scores\n\n");
        if report.summary.by_scorer.is_empty() {
            md.push_str("No scores were produced.\n\n");
        } else {
            md.push_str("| Scorer | Records | Mean | Min | Max |\n");
            md.push_str("|--------|---------|------|-----|-----|\n");
            for (name, summary) in &report.summary.by_scorer {
                md.push_str(&format!(
                    "| {} | {} | {:.3} | {:.3} | {:.3} |\n",
                    name, summary.count, summary.mean, summary.min, summary.max
                ));
            }
            md.push('\n');
        }

        md.push_str("## Records\n\n");
        md.push_str("| # | Status | Scores | Time |\n");
        md.push_str("|---|--------|--------|------|\n");
        for entry in &report.entries {
            let status = match entry.status {
                RecordStatus::Scored => "scored",
                RecordStatus::TaskFailed => "task failed",
                RecordStatus::TimedOut => "timed out",
                RecordStatus::Cancelled => "cancelled",
            };
            let scores = if entry.scores.is_empty() {
                "-".to_string()
            } else {
                entry
                    .scores
                    .iter()
                    .map(|s| format!("{}={:.2}", s.name, s.value))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {:.2}s |\n",
                entry.index, status, scores, entry.duration_secs
            ));
        }
        md.push('\n');

        let failures: Vec<_> = report
            .entries
            .iter()
            .filter(|e| e.error.is_some() || !e.scorer_failures.is_empty())
            .collect();
        if !failures.is_empty() {
            md.push_str("## Failures\n\n");
            for entry in failures {
                if let Some(error) = &entry.error {
                    md.push_str(&format!("- record {}: task: {}\n", entry.index, error));
                }
                for failure in &entry.scorer_failures {
                    md.push_str(&format!(
                        "- record {}: scorer `{}`: {}\n",
                        entry.index, failure.scorer, failure.message
                    ));
                }
            }
            md.push('\n');
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetRecord, JsonMap};
    use crate::report::{RecordReport, ReportAggregator, ScorerFailure};
    use crate::scorer::Score;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_markdown_contains_scores_and_failures() {
        let entries = vec![
            RecordReport {
                index: 0,
                record: DatasetRecord::new("foo"),
                output: Some(json!("foo")),
                metadata: JsonMap::new(),
                scores: vec![Score::new("ExactMatch", 1.0)],
                status: RecordStatus::Scored,
                error: None,
                scorer_failures: vec![ScorerFailure {
                    scorer: "Brevity".to_string(),
                    message: "unrecognized label".to_string(),
                }],
                duration_secs: 0.2,
            },
            RecordReport {
                index: 1,
                record: DatasetRecord::new("bar"),
                output: None,
                metadata: JsonMap::new(),
                scores: vec![],
                status: RecordStatus::TaskFailed,
                error: Some("boom".to_string()),
                scorer_failures: vec![],
                duration_secs: 0.1,
            },
        ];
        let report = ReportAggregator::new(None, Utc::now()).aggregate(entries, 0.3);

        let md = MarkdownReporter::generate(&report);
        assert!(md.contains("| ExactMatch | 1 | 1.000 |"));
        assert!(md.contains("task failed"));
        assert!(md.contains("scorer `Brevity`: unrecognized label"));
        assert!(md.contains("record 1: task: boom"));
    }
}
