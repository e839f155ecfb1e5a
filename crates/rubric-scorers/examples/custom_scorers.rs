//! Built-in scorers alongside a custom one.
//!
//! The task rewrites its input, the built-ins compare against `expected`,
//! and a custom scorer pulls its reference from record metadata instead.

use std::sync::Arc;

use rubric_core::{
    scorer_fn, task_fn, Dataset, DatasetRecord, Evaluation, MarkdownReporter, ScoreValue,
    ScorerArgs, ScorerField,
};
use rubric_scorers::{ExactMatch, Levenshtein};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dataset = Dataset::new(vec![
        DatasetRecord::new("hello world")
            .with_expected("HELLO WORLD")
            .with_metadata("reference", "hello world"),
        DatasetRecord::new("good morning")
            .with_expected("GOOD MORNING")
            .with_metadata("reference", "good evening"),
    ]);

    let task = task_fn(|input: Value| async move {
        let text = input
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("input must be a string"))?;
        Ok(json!(text.to_uppercase()))
    });

    // Compares the output against the record's metadata reference rather
    // than its expected value.
    let metadata_match = scorer_fn(
        "MetadataMatch",
        [ScorerField::Output, ScorerField::Metadata],
        |args: ScorerArgs| async move {
            let reference = args
                .metadata
                .as_ref()
                .and_then(|m| m.get("reference"))
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow::anyhow!("record has no metadata.reference"))?;
            let output = args.output.as_ref().and_then(Value::as_str).unwrap_or("");
            let matched = output.eq_ignore_ascii_case(reference);
            Ok(ScoreValue::Scalar(if matched { 1.0 } else { 0.0 }))
        },
    );

    let report = Evaluation::new(dataset, task)
        .with_scorer(ExactMatch)
        .with_scorer(Levenshtein)
        .with_scorer(metadata_match)
        .run()
        .await?;

    println!("{}", MarkdownReporter::generate(&report));
    Ok(())
}
