//! Model-based classifier scorer
//!
//! An [`LlmClassifier`] renders a prompt template from the record's
//! fields, asks a model to pick one label from an enumerated set, and
//! maps the label to a numeric score through a choice table.
//!
//! Label matching is exact after trimming surrounding whitespace and is
//! case-sensitive: a reply of `"Brief"` against a `"brief"` choice is an
//! unrecognized label, which is a scorer failure rather than a silent
//! zero.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use rubric_core::{Score, ScoreValue, Scorer, ScorerArgs, ScorerField};

use crate::client::{ChatClient, ChatMessage, ChatRequest};
use crate::template::render;

/// The model replied with a label outside the choice table
#[derive(Debug, Error, PartialEq)]
#[error("unrecognized classifier label `{label}`")]
pub struct UnrecognizedLabel {
    /// The trimmed reply
    pub label: String,
}

const CLASSIFIER_FIELDS: &[ScorerField] = &[
    ScorerField::Input,
    ScorerField::Output,
    ScorerField::Expected,
    ScorerField::Metadata,
];

/// Scorer that prompts a model to pick from an enumerated label set
///
/// # Example
///
/// ```rust,ignore
/// let brevity_check = LlmClassifier::new(
///     "Brevity Check",
///     "The output is: {{output.short_history}}\n\
///      If it is longer than 6 sentences answer \"long\", otherwise \"brief\".",
///     "gpt-4o-mini",
///     client,
/// )
/// .with_choice("brief", 1.0)
/// .with_choice("long", 0.0);
/// ```
pub struct LlmClassifier {
    name: String,
    prompt_template: String,
    choice_scores: HashMap<String, f64>,
    model: String,
    temperature: f32,
    client: Arc<dyn ChatClient>,
}

impl LlmClassifier {
    /// Create a classifier with an empty choice table
    pub fn new(
        name: impl Into<String>,
        prompt_template: impl Into<String>,
        model: impl Into<String>,
        client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt_template: prompt_template.into(),
            choice_scores: HashMap::new(),
            model: model.into(),
            temperature: 0.0,
            client,
        }
    }

    /// Map a label to a score
    pub fn with_choice(mut self, label: impl Into<String>, score: f64) -> Self {
        self.choice_scores.insert(label.into(), score);
        self
    }

    /// Map several labels at once
    pub fn with_choices<L: Into<String>>(
        mut self,
        choices: impl IntoIterator<Item = (L, f64)>,
    ) -> Self {
        for (label, score) in choices {
            self.choice_scores.insert(label.into(), score);
        }
        self
    }

    /// Override the sampling temperature (default 0.0)
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn labels_sorted(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.choice_scores.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

#[async_trait]
impl Scorer for LlmClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[ScorerField] {
        CLASSIFIER_FIELDS
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        if self.choice_scores.is_empty() {
            anyhow::bail!("classifier `{}` has no choice scores configured", self.name);
        }

        let context = json!({
            "input": args.input,
            "output": args.output,
            "expected": args.expected,
            "metadata": args.metadata.map(Value::Object),
        });
        let prompt = render(&self.prompt_template, &context)?;

        let instruction = format!(
            "Answer with exactly one of the following labels and nothing else: {}",
            self.labels_sorted().join(", ")
        );
        let request = ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::system(instruction), ChatMessage::user(prompt)],
        )
        .with_temperature(self.temperature);

        let reply = self.client.complete(request).await?;
        let label = reply.trim();

        match self.choice_scores.get(label) {
            Some(&value) => Ok(ScoreValue::Named(Score::new(&self.name, value))),
            None => {
                tracing::warn!(classifier = %self.name, %label, "model picked an unknown label");
                Err(UnrecognizedLabel {
                    label: label.to_string(),
                }
                .into())
            }
        }
    }
}
