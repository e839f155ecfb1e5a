//! The evaluation harness
//!
//! Runs the task once per dataset record, fans records out up to the
//! configured concurrency limit, scores each output with every configured
//! scorer, and collects everything into a report in dataset order.
//!
//! Task and scorer failures are isolated per record and per scorer; a
//! cancelled run reports in-flight records as cancelled rather than
//! dropping them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::dataset::{Dataset, DatasetRecord, JsonMap};
use crate::error::EvalResult;
use crate::report::{EvalReport, RecordReport, RecordStatus, ReportAggregator, ScorerFailure};
use crate::scorer::{Score, Scorer, ScorerArgs, ScorerField};
use crate::task::{Task, TaskHooks};
use crate::trace::Trace;

use super::EvalConfig;

/// An evaluation run under construction
///
/// # Example
///
/// ```rust,ignore
/// let report = Evaluation::new(dataset, task_fn(|input| async move { Ok(input) }))
///     .with_scorer(exact_match)
///     .with_config(EvalConfig::new(4))
///     .run()
///     .await?;
/// ```
pub struct Evaluation {
    dataset: Dataset,
    task: Arc<dyn Task>,
    scorers: Vec<Arc<dyn Scorer>>,
    config: EvalConfig,
    cancellation: CancellationToken,
}

impl Evaluation {
    /// Create an evaluation of `task` over `dataset`
    pub fn new(dataset: impl Into<Dataset>, task: impl Task + 'static) -> Self {
        Self {
            dataset: dataset.into(),
            task: Arc::new(task),
            scorers: Vec::new(),
            config: EvalConfig::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Add a scorer
    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorers.push(Arc::new(scorer));
        self
    }

    /// Add several already-shared scorers
    pub fn with_scorers(mut self, scorers: impl IntoIterator<Item = Arc<dyn Scorer>>) -> Self {
        self.scorers.extend(scorers);
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a cancellation token
    ///
    /// Cancelling the token lets in-flight records reach a cancellation
    /// checkpoint and abandon cleanly; they are reported as cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Run the evaluation
    pub async fn run(self) -> EvalResult<EvalReport> {
        let Self {
            dataset,
            task,
            scorers,
            config,
            cancellation,
        } = self;

        let started_at = Utc::now();
        let start = Instant::now();
        let concurrency = config.effective_concurrency();
        let timeout = config.task_timeout();
        let total = dataset.len();

        tracing::debug!(records = total, concurrency, "starting evaluation");

        let record_futures = dataset
            .into_records()
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let task = Arc::clone(&task);
                let scorers = scorers.clone();
                let token = cancellation.clone();
                async move { run_record(index, record, task, &scorers, timeout, token).await }
            });

        let entries: Vec<RecordReport> = stream::iter(record_futures)
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let report = ReportAggregator::new(config.experiment.clone(), started_at)
            .aggregate(entries, start.elapsed().as_secs_f64());

        tracing::info!(
            records = total,
            scored = report.summary.scored_records,
            failed = report.summary.failed_records,
            duration_secs = report.total_duration_secs,
            "evaluation finished"
        );

        Ok(report)
    }
}

/// Run `task` over `dataset` and score every output with `scorers`
///
/// Convenience wrapper over [`Evaluation`] matching the harness's single
/// entry point: records fan out up to `concurrency` at a time and the
/// report comes back in dataset order.
pub async fn run_evaluation(
    dataset: impl Into<Dataset>,
    task: impl Task + 'static,
    scorers: Vec<Arc<dyn Scorer>>,
    concurrency: usize,
) -> EvalResult<EvalReport> {
    Evaluation::new(dataset, task)
        .with_scorers(scorers)
        .with_config(EvalConfig::new(concurrency))
        .run()
        .await
}

enum TaskOutcome {
    Finished(anyhow::Result<Value>),
    TimedOut,
    Cancelled,
}

async fn run_record(
    index: usize,
    record: DatasetRecord,
    task: Arc<dyn Task>,
    scorers: &[Arc<dyn Scorer>],
    timeout: Option<Duration>,
    cancellation: CancellationToken,
) -> RecordReport {
    let start = Instant::now();
    let hooks = TaskHooks::new(record.metadata.clone());

    let outcome = {
        let run = run_task(&*task, record.input.clone(), hooks.clone(), timeout);
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => TaskOutcome::Cancelled,
            outcome = run => outcome,
        }
    };

    match outcome {
        TaskOutcome::Finished(Ok(output)) => {
            let (metadata, trace) = hooks.freeze();
            let scoring = score_record(index, &record, &output, &metadata, &trace, scorers);
            let scored = tokio::select! {
                biased;
                _ = cancellation.cancelled() => None,
                scored = scoring => Some(scored),
            };
            match scored {
                Some((scores, scorer_failures)) => RecordReport {
                    index,
                    record,
                    output: Some(output),
                    metadata,
                    scores,
                    status: RecordStatus::Scored,
                    error: None,
                    scorer_failures,
                    duration_secs: start.elapsed().as_secs_f64(),
                },
                None => unscored(index, record, RecordStatus::Cancelled, "evaluation cancelled", start),
            }
        }
        TaskOutcome::Finished(Err(e)) => {
            tracing::warn!(record = index, error = %e, "task failed");
            unscored(index, record, RecordStatus::TaskFailed, format!("{e:#}"), start)
        }
        TaskOutcome::TimedOut => {
            tracing::warn!(record = index, "task timed out");
            unscored(index, record, RecordStatus::TimedOut, "task timed out", start)
        }
        TaskOutcome::Cancelled => {
            unscored(index, record, RecordStatus::Cancelled, "evaluation cancelled", start)
        }
    }
}

async fn run_task(
    task: &dyn Task,
    input: Value,
    hooks: TaskHooks,
    timeout: Option<Duration>,
) -> TaskOutcome {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, task.run(input, hooks)).await {
            Ok(result) => TaskOutcome::Finished(result),
            Err(_) => TaskOutcome::TimedOut,
        },
        None => TaskOutcome::Finished(task.run(input, hooks).await),
    }
}

/// Run every scorer against one task result, concurrently and isolated
async fn score_record(
    index: usize,
    record: &DatasetRecord,
    output: &Value,
    metadata: &JsonMap,
    trace: &Trace,
    scorers: &[Arc<dyn Scorer>],
) -> (Vec<Score>, Vec<ScorerFailure>) {
    let scorer_futures = scorers.iter().map(|scorer| {
        let args = build_args(scorer.requires(), record, output, metadata, trace);
        async move {
            let name = scorer.name().to_string();
            match scorer.score(args).await {
                Ok(value) => Ok(value.normalize(&name)),
                Err(e) => {
                    tracing::warn!(record = index, scorer = %name, error = %e, "scorer failed");
                    Err(ScorerFailure {
                        scorer: name,
                        message: format!("{e:#}"),
                    })
                }
            }
        }
    });

    let mut scores = Vec::new();
    let mut failures = Vec::new();
    for result in join_all(scorer_futures).await {
        match result {
            Ok(named) => scores.extend(named),
            Err(failure) => failures.push(failure),
        }
    }
    (scores, failures)
}

/// Populate exactly the fields the scorer declared
fn build_args(
    requires: &[ScorerField],
    record: &DatasetRecord,
    output: &Value,
    metadata: &JsonMap,
    trace: &Trace,
) -> ScorerArgs {
    let mut args = ScorerArgs::default();
    for field in requires {
        match field {
            ScorerField::Input => args.input = Some(record.input.clone()),
            ScorerField::Output => args.output = Some(output.clone()),
            ScorerField::Expected => args.expected = record.expected.clone(),
            ScorerField::Metadata => args.metadata = Some(metadata.clone()),
            ScorerField::Trace => args.trace = Some(trace.clone()),
        }
    }
    args
}

fn unscored(
    index: usize,
    record: DatasetRecord,
    status: RecordStatus,
    error: impl Into<String>,
    start: Instant,
) -> RecordReport {
    let metadata = record.metadata.clone();
    RecordReport {
        index,
        record,
        output: None,
        metadata,
        scores: Vec::new(),
        status,
        error: Some(error.into()),
        scorer_failures: Vec::new(),
        duration_secs: start.elapsed().as_secs_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{scorer_fn, ScoreValue};
    use crate::task::task_fn;
    use serde_json::json;

    fn identity_dataset() -> Dataset {
        Dataset::new(vec![
            DatasetRecord::new("foo").with_expected("foo"),
            DatasetRecord::new("bar").with_expected("bar"),
        ])
    }

    fn exact_match() -> impl Scorer {
        scorer_fn(
            "ExactMatch",
            [ScorerField::Output, ScorerField::Expected],
            |args: ScorerArgs| async move {
                let matched = args.output.is_some() && args.output == args.expected;
                Ok(ScoreValue::Scalar(if matched { 1.0 } else { 0.0 }))
            },
        )
    }

    #[tokio::test]
    async fn test_identity_exact_match() {
        let report = Evaluation::new(identity_dataset(), task_fn(|input| async move { Ok(input) }))
            .with_scorer(exact_match())
            .run()
            .await
            .unwrap();

        assert_eq!(report.entries.len(), 2);
        for entry in &report.entries {
            assert_eq!(entry.status, RecordStatus::Scored);
            assert_eq!(entry.scores, vec![Score::new("ExactMatch", 1.0)]);
        }
        assert_eq!(report.mean_score("ExactMatch"), Some(1.0));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_reports_all_records() {
        let token = CancellationToken::new();
        token.cancel();

        let report = Evaluation::new(identity_dataset(), task_fn(|input| async move {
            // A cancellation checkpoint before any work
            tokio::task::yield_now().await;
            Ok(input)
        }))
        .with_scorer(exact_match())
        .with_cancellation(token)
        .run()
        .await
        .unwrap();

        assert_eq!(report.entries.len(), 2);
        for entry in &report.entries {
            assert_eq!(entry.status, RecordStatus::Cancelled);
            assert!(entry.scores.is_empty());
            assert!(entry.output.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_timeout_is_a_task_failure() {
        let dataset = Dataset::new(vec![DatasetRecord::new("slow")]);
        let task = task_fn(|input| async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(input)
        });

        let report = Evaluation::new(dataset, task)
            .with_scorer(exact_match())
            .with_config(EvalConfig::default().with_task_timeout(1))
            .run()
            .await
            .unwrap();

        assert_eq!(report.entries[0].status, RecordStatus::TimedOut);
        assert!(report.entries[0].scores.is_empty());
        assert_eq!(report.summary.failed_records, 1);
    }

    #[tokio::test]
    async fn test_scorer_sees_only_declared_fields() {
        let dataset = Dataset::new(vec![DatasetRecord::new("foo")
            .with_expected("foo")
            .with_metadata("next", "bar")]);

        let picky = scorer_fn(
            "Picky",
            [ScorerField::Output, ScorerField::Expected],
            |args: ScorerArgs| async move {
                assert!(args.input.is_none());
                assert!(args.metadata.is_none());
                assert!(args.trace.is_none());
                assert_eq!(args.output, Some(json!("foo")));
                Ok(ScoreValue::Scalar(1.0))
            },
        );

        let report = Evaluation::new(dataset, task_fn(|input| async move { Ok(input) }))
            .with_scorer(picky)
            .run()
            .await
            .unwrap();
        assert_eq!(report.entries[0].scores.len(), 1);
    }
}
