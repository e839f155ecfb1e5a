//! Built-in scorers run through the full harness.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rubric_core::{run_evaluation, task_fn, Dataset, DatasetRecord, RecordStatus, Scorer};
use rubric_scorers::{
    ChatClient, ChatRequest, ExactMatch, Levenshtein, LlmClassifier, NumericDiff,
};

/// Chat client replaying canned replies in order
struct ScriptedClient {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
        self.prompts.lock().push(request.messages.last().unwrap().content.clone());
        self.replies
            .lock()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
    }
}

#[tokio::test]
async fn builtin_scorers_score_identity_dataset() {
    let dataset = Dataset::new(vec![
        DatasetRecord::new("foo").with_expected("foo"),
        DatasetRecord::new("bar").with_expected("baz"),
    ]);

    let scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(ExactMatch), Arc::new(Levenshtein)];
    let report = run_evaluation(dataset, task_fn(|input| async move { Ok(input) }), scorers, 2)
        .await
        .unwrap();

    assert_eq!(report.entries[0].score("ExactMatch").unwrap().value, 1.0);
    assert_eq!(report.entries[0].score("Levenshtein").unwrap().value, 1.0);

    assert_eq!(report.entries[1].score("ExactMatch").unwrap().value, 0.0);
    // "bar" vs "baz": one substitution over three characters
    let lev = report.entries[1].score("Levenshtein").unwrap().value;
    assert!((lev - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
}

#[tokio::test]
async fn numeric_diff_failure_is_isolated_per_record() {
    let dataset = Dataset::new(vec![
        DatasetRecord::new(90).with_expected(100),
        DatasetRecord::new("not a number").with_expected(100),
    ]);

    let scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(NumericDiff)];
    let report = run_evaluation(dataset, task_fn(|input| async move { Ok(input) }), scorers, 2)
        .await
        .unwrap();

    let ok = &report.entries[0];
    assert_eq!(ok.status, RecordStatus::Scored);
    assert!((ok.score("NumericDiff").unwrap().value - 0.9).abs() < 1e-9);

    let bad = &report.entries[1];
    assert_eq!(bad.status, RecordStatus::Scored);
    assert!(bad.score("NumericDiff").is_none());
    assert_eq!(bad.scorer_failures.len(), 1);
    assert_eq!(bad.scorer_failures[0].scorer, "NumericDiff");
}

#[tokio::test]
async fn classifier_scores_each_record_from_the_rendered_prompt() {
    let client = ScriptedClient::new(&["brief", "long"]);

    let classifier = LlmClassifier::new(
        "Brevity Check",
        "Check if this output is too long: {{output}}",
        "gpt-4o-mini",
        client.clone(),
    )
    .with_choice("brief", 1.0)
    .with_choice("long", 0.0);

    let dataset = Dataset::new(vec![
        DatasetRecord::new("short answer"),
        DatasetRecord::new("a very long answer"),
    ]);

    let scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(classifier)];
    // Concurrency 1 keeps the scripted replies aligned with record order.
    let report = run_evaluation(dataset, task_fn(|input| async move { Ok(input) }), scorers, 1)
        .await
        .unwrap();

    assert_eq!(report.entries[0].score("Brevity Check").unwrap().value, 1.0);
    assert_eq!(report.entries[1].score("Brevity Check").unwrap().value, 0.0);

    let prompts = client.prompts.lock();
    assert!(prompts[0].contains("short answer"));
    assert!(prompts[1].contains("a very long answer"));
}

#[tokio::test]
async fn unrecognized_label_becomes_a_scorer_failure() {
    let client = ScriptedClient::new(&["maybe"]);

    let classifier = LlmClassifier::new(
        "Brevity Check",
        "{{output}}",
        "gpt-4o-mini",
        client,
    )
    .with_choice("brief", 1.0)
    .with_choice("long", 0.0);

    let dataset = Dataset::new(vec![DatasetRecord::new("anything")]);
    let scorers: Vec<Arc<dyn Scorer>> = vec![Arc::new(classifier)];
    let report = run_evaluation(dataset, task_fn(|input| async move { Ok(input) }), scorers, 1)
        .await
        .unwrap();

    let entry = &report.entries[0];
    assert_eq!(entry.status, RecordStatus::Scored);
    assert!(entry.scores.is_empty(), "no silent zero for unknown labels");
    assert_eq!(entry.scorer_failures.len(), 1);
    assert!(entry.scorer_failures[0].message.contains("unrecognized classifier label `maybe`"));
}
