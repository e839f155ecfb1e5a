//! Scoring a multi-turn support agent on behavior, not just output.
//!
//! The simulated agent records a tool span when it escalates a
//! conversation. A trace scorer checks that escalation happened exactly
//! when the record says it should have, and an [`LlmClassifier`] judges
//! the tone of the final reply. Set `OPENAI_BASE_URL` and
//! `OPENAI_API_KEY` to use a live endpoint; otherwise a scripted client
//! stands in so the example runs offline.

use std::sync::Arc;

use async_trait::async_trait;
use rubric_core::{
    scorer_fn, task_fn_with_hooks, Dataset, DatasetRecord, Evaluation, MarkdownReporter,
    ScoreValue, ScorerArgs, ScorerField, TaskHooks,
};
use rubric_scorers::{ChatClient, ChatRequest, LlmClassifier, ProxyChatClient};
use serde_json::{json, Value};

/// Offline stand-in: calls any conversation mentioning a refund polite.
struct ScriptedJudge;

#[async_trait]
impl ChatClient for ScriptedJudge {
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
        let prompt = request.messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(if prompt.contains("refund") { "polite" } else { "curt" }.to_string())
    }
}

fn judge_client() -> anyhow::Result<Arc<dyn ChatClient>> {
    match (std::env::var("OPENAI_BASE_URL"), std::env::var("OPENAI_API_KEY")) {
        (Ok(base), Ok(key)) => Ok(Arc::new(ProxyChatClient::new(base, key)?)),
        _ => Ok(Arc::new(ScriptedJudge)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dataset = Dataset::new(vec![
        DatasetRecord::new(json!([
            {"role": "user", "content": "I was double charged for my order."},
            {"role": "user", "content": "This is the third time. I want a refund now."}
        ]))
        .with_metadata("should_escalate", true),
        DatasetRecord::new(json!([
            {"role": "user", "content": "What are your support hours?"}
        ]))
        .with_metadata("should_escalate", false),
    ]);

    // A toy agent: escalates when the customer sounds angry, records the
    // escalation as a tool span so scorers can see it.
    let agent = task_fn_with_hooks(|input: Value, hooks: TaskHooks| async move {
        let turns = input.as_array().cloned().unwrap_or_default();
        let angry = turns.iter().any(|turn| {
            turn["content"]
                .as_str()
                .map(|c| c.contains("refund") || c.contains("third time"))
                .unwrap_or(false)
        });

        if angry {
            hooks.record_tool_call("escalate");
            Ok(json!("I understand the frustration. I have escalated this \
                      to a specialist who will process your refund."))
        } else {
            Ok(json!("Our support team is available 9am to 5pm on weekdays."))
        }
    });

    // Did the agent escalate exactly when the record says it should have?
    let escalation_check = scorer_fn(
        "Escalation",
        [ScorerField::Metadata, ScorerField::Trace],
        |args: ScorerArgs| async move {
            let should = args
                .metadata
                .as_ref()
                .and_then(|m| m.get("should_escalate"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let did = args
                .trace
                .as_ref()
                .map(|t| t.tool_was_called("escalate"))
                .unwrap_or(false);
            Ok(ScoreValue::Scalar(if should == did { 1.0 } else { 0.0 }))
        },
    );

    let tone_check = LlmClassifier::new(
        "Tone",
        "A support agent replied:\n{{output}}\n\
         Is the reply polite or curt?",
        "gpt-4o-mini",
        judge_client()?,
    )
    .with_choice("polite", 1.0)
    .with_choice("curt", 0.0);

    let report = Evaluation::new(dataset, agent)
        .with_scorer(escalation_check)
        .with_scorer(tone_check)
        .run()
        .await?;

    println!("{}", MarkdownReporter::generate(&report));
    Ok(())
}
