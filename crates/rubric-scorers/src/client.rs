//! Chat and embedding clients for model-based scorers
//!
//! Scorers that call a model do so through the [`ChatClient`] and
//! [`EmbeddingClient`] traits. [`ProxyChatClient`] implements both
//! against any OpenAI-compatible endpoint (a provider API or an AI
//! proxy); the endpoint and credential come from the caller, never from
//! the harness.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

/// A message in a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: ChatRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A chat completion request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name
    pub model: String,

    /// Conversation messages
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum completion tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Seed, for providers/proxies that cache on it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ChatRequest {
    /// Create a request with a model and messages
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            seed: None,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Client producing a chat completion for a request
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Return the assistant's reply text
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String>;
}

/// Client producing an embedding vector for a text
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed `text` with the given model
    async fn embed(&self, model: &str, text: &str) -> anyhow::Result<Vec<f64>>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

/// Client for any OpenAI-compatible chat/embeddings endpoint
///
/// The harness passes the credential through as a bearer token and never
/// stores or derives it.
pub struct ProxyChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ProxyChatClient {
    /// Create a client for the given base URL and API key
    ///
    /// `base_url` is the prefix ending before `/chat/completions`, e.g.
    /// `https://api.openai.com/v1` or a proxy's `/v1/proxy` URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ChatClient for ProxyChatClient {
    async fn complete(&self, request: ChatRequest) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %request.model, %url, "requesting chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat completion failed with {status}: {body}");
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("chat completion returned no content"))
    }
}

#[async_trait]
impl EmbeddingClient for ProxyChatClient {
    async fn embed(&self, model: &str, text: &str) -> anyhow::Result<Vec<f64>> {
        let url = format!("{}/embeddings", self.base_url);
        tracing::debug!(%model, %url, "requesting embedding");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model, input: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("embedding request failed with {status}: {body}");
        }

        let embedding: EmbeddingResponse = response.json().await?;
        embedding
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow::anyhow!("embedding response contained no data"))
    }
}
