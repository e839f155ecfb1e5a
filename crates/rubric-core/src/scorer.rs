//! Scorers and score normalization
//!
//! A scorer computes one or more named numeric signals from some subset of
//! a record's fields. Instead of inspecting parameter names at call time,
//! each scorer declares the fields it needs through a capability
//! descriptor ([`Scorer::requires`]); the executor supplies exactly that
//! subset in [`ScorerArgs`].

use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::JsonMap;
use crate::trace::Trace;

/// Fields a scorer can request from the record and task result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerField {
    /// The record's input
    Input,
    /// The task's output
    Output,
    /// The record's expected value
    Expected,
    /// The task-mutated metadata snapshot
    Metadata,
    /// The span record of the task's execution
    Trace,
}

/// The subset of fields a scorer declared, populated at call time
///
/// Fields the scorer did not declare are `None` even when present on the
/// record; extra unused fields never reach the scorer.
#[derive(Debug, Clone, Default)]
pub struct ScorerArgs {
    /// Record input, if declared
    pub input: Option<Value>,
    /// Task output, if declared
    pub output: Option<Value>,
    /// Expected value, if declared and present on the record
    pub expected: Option<Value>,
    /// Metadata snapshot, if declared
    pub metadata: Option<JsonMap>,
    /// Trace handle, if declared
    pub trace: Option<Trace>,
}

/// One named numeric quality signal, 0.0-1.0 by convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Name the score is reported under
    pub name: String,

    /// Numeric value
    pub value: f64,
}

impl Score {
    /// Create a named score
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// What a single scorer invocation may return
///
/// Normalized immediately after invocation: a bare number takes the
/// scorer's own name, a composite scorer contributes several named scores.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreValue {
    /// A bare number, named after the scorer
    Scalar(f64),
    /// A single named score, used as-is
    Named(Score),
    /// Several named scores from one invocation
    Multiple(Vec<Score>),
}

impl ScoreValue {
    /// Normalize into named scores, using `scorer_name` for bare numbers
    pub fn normalize(self, scorer_name: &str) -> Vec<Score> {
        match self {
            ScoreValue::Scalar(value) => vec![Score::new(scorer_name, value)],
            ScoreValue::Named(score) => vec![score],
            ScoreValue::Multiple(scores) => scores,
        }
    }
}

impl From<f64> for ScoreValue {
    fn from(value: f64) -> Self {
        ScoreValue::Scalar(value)
    }
}

impl From<Score> for ScoreValue {
    fn from(score: Score) -> Self {
        ScoreValue::Named(score)
    }
}

impl From<Vec<Score>> for ScoreValue {
    fn from(scores: Vec<Score>) -> Self {
        ScoreValue::Multiple(scores)
    }
}

/// A function computing a quality signal from a task result
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Name bare scores are reported under
    fn name(&self) -> &str;

    /// Capability descriptor: the fields this scorer needs
    fn requires(&self) -> &[ScorerField];

    /// Compute the score
    ///
    /// Errors are isolated per (record, scorer) pair: they are recorded as
    /// a missing score and never prevent other scorers from running.
    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue>;
}

/// Scorer built from an async closure
pub struct FnScorer<F> {
    name: String,
    requires: Vec<ScorerField>,
    f: F,
}

#[async_trait]
impl<F, Fut> Scorer for FnScorer<F>
where
    F: Fn(ScorerArgs) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ScoreValue>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[ScorerField] {
        &self.requires
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        (self.f)(args).await
    }
}

/// Wrap an async closure as a [`Scorer`] with an explicit field set
pub fn scorer_fn<F, Fut>(
    name: impl Into<String>,
    requires: impl Into<Vec<ScorerField>>,
    f: F,
) -> FnScorer<F>
where
    F: Fn(ScorerArgs) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<ScoreValue>> + Send,
{
    FnScorer {
        name: name.into(),
        requires: requires.into(),
        f,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_normalizes_to_scorer_name() {
        let scores = ScoreValue::Scalar(0.73).normalize("Brevity");
        assert_eq!(scores, vec![Score::new("Brevity", 0.73)]);
    }

    #[test]
    fn test_named_and_multiple_keep_their_names() {
        let named = ScoreValue::Named(Score::new("custom", 1.0)).normalize("ignored");
        assert_eq!(named[0].name, "custom");

        let multi = ScoreValue::Multiple(vec![
            Score::new("precision", 0.9),
            Score::new("recall", 0.8),
        ])
        .normalize("ignored");
        assert_eq!(multi.len(), 2);
    }

    #[tokio::test]
    async fn test_fn_scorer() {
        let scorer = scorer_fn(
            "ExactMatch",
            [ScorerField::Output, ScorerField::Expected],
            |args: ScorerArgs| async move {
                let matched = args.output == args.expected;
                Ok(ScoreValue::Scalar(if matched { 1.0 } else { 0.0 }))
            },
        );

        assert_eq!(scorer.name(), "ExactMatch");
        assert_eq!(
            scorer.requires(),
            &[ScorerField::Output, ScorerField::Expected]
        );

        let args = ScorerArgs {
            output: Some(json!("foo")),
            expected: Some(json!("foo")),
            ..Default::default()
        };
        let value = scorer.score(args).await.unwrap();
        assert_eq!(value.normalize(scorer.name()), vec![Score::new("ExactMatch", 1.0)]);
    }
}
