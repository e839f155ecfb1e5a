//! Embedding-based similarity scorer

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use rubric_core::{ScoreValue, Scorer, ScorerArgs, ScorerField};

use crate::client::EmbeddingClient;

const OUTPUT_EXPECTED: &[ScorerField] = &[ScorerField::Output, ScorerField::Expected];

/// Cosine similarity between two vectors
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Scores the cosine similarity of output and expected embeddings
///
/// Negative cosine values are clamped to 0.0 so the score stays in the
/// 0..1 convention.
pub struct EmbeddingSimilarity {
    model: String,
    client: Arc<dyn EmbeddingClient>,
}

impl EmbeddingSimilarity {
    /// Create a scorer embedding with `model` through `client`
    pub fn new(model: impl Into<String>, client: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            model: model.into(),
            client,
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Scorer for EmbeddingSimilarity {
    fn name(&self) -> &str {
        "EmbeddingSimilarity"
    }

    fn requires(&self) -> &[ScorerField] {
        OUTPUT_EXPECTED
    }

    async fn score(&self, args: ScorerArgs) -> anyhow::Result<ScoreValue> {
        let output = args
            .output
            .as_ref()
            .map(value_text)
            .ok_or_else(|| anyhow::anyhow!("EmbeddingSimilarity requires the task output"))?;
        let expected = args
            .expected
            .as_ref()
            .map(value_text)
            .ok_or_else(|| {
                anyhow::anyhow!("EmbeddingSimilarity requires an expected value on the record")
            })?;

        let (output_vec, expected_vec) = tokio::try_join!(
            self.client.embed(&self.model, &output),
            self.client.embed(&self.model, &expected),
        )?;

        let similarity = cosine_similarity(&output_vec, &expected_vec);
        Ok(ScoreValue::Scalar(similarity.clamp(0.0, 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedEmbeddings;

    #[async_trait]
    impl EmbeddingClient for FixedEmbeddings {
        async fn embed(&self, _model: &str, text: &str) -> anyhow::Result<Vec<f64>> {
            // Orthogonal unit vectors for distinct texts, identical for equal ones
            Ok(match text {
                "foo" => vec![1.0, 0.0],
                _ => vec![0.0, 1.0],
            })
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[tokio::test]
    async fn test_identical_texts_score_one() {
        let scorer = EmbeddingSimilarity::new("test-embed", Arc::new(FixedEmbeddings));
        let value = scorer
            .score(ScorerArgs {
                output: Some(json!("foo")),
                expected: Some(json!("foo")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(value, ScoreValue::Scalar(1.0));
    }

    #[tokio::test]
    async fn test_orthogonal_texts_score_zero() {
        let scorer = EmbeddingSimilarity::new("test-embed", Arc::new(FixedEmbeddings));
        let value = scorer
            .score(ScorerArgs {
                output: Some(json!("foo")),
                expected: Some(json!("bar")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(value, ScoreValue::Scalar(0.0));
    }
}
