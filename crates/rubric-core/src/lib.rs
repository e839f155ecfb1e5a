//! Rubric evaluation harness
//!
//! Runs a task function over a dataset, scores each output with one or
//! more scorers (deterministic or model-based), and aggregates the
//! results into a report in dataset order.
//!
//! # Features
//!
//! - **Dataset model**: in-memory or JSON-file datasets of
//!   input/expected/metadata records
//! - **Task runner**: async tasks with an optional per-record metadata
//!   side channel and span recording
//! - **Scorer executor**: capability-declaring scorers, run concurrently
//!   and isolated per (record, scorer) pair
//! - **Concurrency**: bounded fan-out across records, cooperative
//!   cancellation, per-record timeouts
//! - **Reports**: order-preserving aggregation plus JSON and Markdown
//!   rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use rubric_core::{run_evaluation, task_fn, scorer_fn, Dataset, DatasetRecord, ScorerField, ScoreValue};
//!
//! let dataset = Dataset::new(vec![
//!     DatasetRecord::new("foo").with_expected("foo"),
//!     DatasetRecord::new("bar").with_expected("bar"),
//! ]);
//! let task = task_fn(|input| async move { Ok(input) });
//! let report = run_evaluation(dataset, task, scorers, 4).await?;
//! ```

pub mod dataset;
pub mod error;
pub mod report;
pub mod runner;
pub mod scorer;
pub mod task;
pub mod trace;

// Re-exports for convenience
pub use dataset::{Dataset, DatasetRecord, JsonMap};
pub use error::{EvalError, EvalResult};
pub use report::{
    EvalReport, JsonReporter, MarkdownReporter, RecordReport, RecordStatus, ReportAggregator,
    ReportSummary, ScorerFailure, ScorerSummary,
};
pub use runner::{run_evaluation, EvalConfig, Evaluation};
pub use scorer::{scorer_fn, FnScorer, Score, ScoreValue, Scorer, ScorerArgs, ScorerField};
pub use task::{task_fn, task_fn_with_hooks, FnTask, HookedFnTask, Task, TaskHooks};
pub use trace::{Span, SpanKind, Trace};
