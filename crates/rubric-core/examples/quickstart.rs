//! Minimal harness walkthrough: an identity task over a two-record
//! dataset, a custom exact-match scorer, and a Markdown report.
//!
//! Run with: `cargo run --example quickstart`

use rubric_core::{
    scorer_fn, task_fn_with_hooks, Dataset, DatasetRecord, EvalConfig, Evaluation,
    MarkdownReporter, Score, ScoreValue, ScorerArgs, ScorerField, TaskHooks,
};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("rubric_core=debug")
        .init();

    let dataset = Dataset::new(vec![
        DatasetRecord::new("foo").with_expected("foo").with_metadata("next", "bar"),
        DatasetRecord::new("bar").with_expected("bar").with_metadata("next", "baz"),
    ]);

    // Tasks can write to a per-record metadata side channel for scorers to
    // read later.
    let task = task_fn_with_hooks(|input: Value, hooks: TaskHooks| async move {
        hooks.set_metadata("result", input.clone());
        Ok(input)
    });

    // A custom scorer returning a structured score under its own name.
    let custom_exact_match = scorer_fn(
        "Custom Exact Match",
        [ScorerField::Output, ScorerField::Expected],
        |args: ScorerArgs| async move {
            let matched = args.output.is_some() && args.output == args.expected;
            Ok(ScoreValue::Named(Score::new(
                "Custom Exact Match",
                if matched { 1.0 } else { 0.0 },
            )))
        },
    );

    // A scorer that reads the metadata the task wrote.
    let metadata_echo = scorer_fn(
        "Metadata Echo",
        [ScorerField::Output, ScorerField::Metadata],
        |args: ScorerArgs| async move {
            let echoed = args
                .metadata
                .and_then(|m| m.get("result").cloned())
                == args.output;
            Ok(ScoreValue::Scalar(if echoed { 1.0 } else { 0.0 }))
        },
    );

    let report = Evaluation::new(dataset, task)
        .with_scorer(custom_exact_match)
        .with_scorer(metadata_echo)
        .with_config(EvalConfig::new(2).with_experiment("quickstart"))
        .run()
        .await?;

    println!("{}", MarkdownReporter::generate(&report));
    Ok(())
}
