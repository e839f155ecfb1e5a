//! Deterministic scorers
//!
//! Direct output/expected comparisons that need no model call.

use async_trait::async_trait;
use serde_json::Value;

use rubric_core::{ScoreValue, Scorer, ScorerArgs, ScorerField};

const OUTPUT_EXPECTED: &[ScorerField] = &[ScorerField::Output, ScorerField::Expected];

fn expected_or_err(args: &ScorerArgs, scorer: &str) -> anyhow::Result<Value> {
    args.expected
        .clone()
        .ok_or_else(|| anyhow::anyhow!("{scorer} requires an expected value on the record"))
}

/// Text form of a JSON value: strings raw, everything else as JSON
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Scores 1.0 when output and expected are equal, 0.0 otherwise
pub struct ExactMatch;

#[async_trait]
impl Scorer for ExactMatch {
    fn name(&self) -> &str {
        "ExactMatch"
    }

    fn requires(&self) -> &[ScorerField] {
        OUTPUT_EXPECTED
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        let expected = expected_or_err(&args, "ExactMatch")?;
        let matched = args.output.as_ref() == Some(&expected);
        Ok(ScoreValue::Scalar(if matched { 1.0 } else { 0.0 }))
    }
}

/// Relative numeric distance between output and expected, mapped to 0..1
///
/// `1 - |a - b| / max(|a|, |b|)`, with two equal numbers (including two
/// zeros) scoring 1.0. Numeric strings are accepted.
pub struct NumericDiff;

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl Scorer for NumericDiff {
    fn name(&self) -> &str {
        "NumericDiff"
    }

    fn requires(&self) -> &[ScorerField] {
        OUTPUT_EXPECTED
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        let expected = expected_or_err(&args, "NumericDiff")?;
        let output = args
            .output
            .as_ref()
            .and_then(as_number)
            .ok_or_else(|| anyhow::anyhow!("NumericDiff output is not numeric"))?;
        let expected = as_number(&expected)
            .ok_or_else(|| anyhow::anyhow!("NumericDiff expected value is not numeric"))?;

        let score = if output == expected {
            1.0
        } else {
            1.0 - (output - expected).abs() / output.abs().max(expected.abs())
        };
        Ok(ScoreValue::Scalar(score.clamp(0.0, 1.0)))
    }
}

/// Normalized Levenshtein similarity between output and expected text
///
/// `1 - distance / max(len)`; two empty strings score 1.0.
pub struct Levenshtein;

#[async_trait]
impl Scorer for Levenshtein {
    fn name(&self) -> &str {
        "Levenshtein"
    }

    fn requires(&self) -> &[ScorerField] {
        OUTPUT_EXPECTED
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        let expected = expected_or_err(&args, "Levenshtein")?;
        let output = args
            .output
            .as_ref()
            .map(value_text)
            .ok_or_else(|| anyhow::anyhow!("Levenshtein requires the task output"))?;
        let expected = value_text(&expected);

        let max_len = output.chars().count().max(expected.chars().count());
        let score = if max_len == 0 {
            1.0
        } else {
            1.0 - levenshtein_distance(&output, &expected) as f64 / max_len as f64
        };
        Ok(ScoreValue::Scalar(score))
    }
}

/// Edit distance over characters, two-row dynamic programming
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
