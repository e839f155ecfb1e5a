//! Evaluation reports
//!
//! Per-record results, the order-preserving aggregator, and JSON/Markdown
//! rendering.

mod aggregator;
mod json;
mod markdown;
mod types;

pub use aggregator::ReportAggregator;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use types::{
    EvalReport, RecordReport, RecordStatus, ReportSummary, ScorerFailure, ScorerSummary,
};
