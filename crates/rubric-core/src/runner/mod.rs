//! Evaluation runner
//!
//! Fan-out of records to the task, concurrent scoring, and order-preserving
//! collection into a report.

mod config;
mod harness;

pub use config::EvalConfig;
pub use harness::{run_evaluation, Evaluation};
