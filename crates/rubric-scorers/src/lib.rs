//! Built-in scorers for the rubric evaluation harness
//!
//! Deterministic comparisons ([`ExactMatch`], [`NumericDiff`],
//! [`Levenshtein`]), embedding similarity, and the model-based
//! [`LlmClassifier`], together with the OpenAI-compatible
//! [`ProxyChatClient`] they call through.
//!
//! # Example
//!
//! ```rust,ignore
//! use rubric_scorers::{ExactMatch, LlmClassifier, ProxyChatClient};
//!
//! let client = Arc::new(ProxyChatClient::new(base_url, api_key)?);
//! let brevity = LlmClassifier::new("Brevity Check", template, "gpt-4o-mini", client)
//!     .with_choice("brief", 1.0)
//!     .with_choice("long", 0.0);
//!
//! let report = Evaluation::new(dataset, task)
//!     .with_scorer(ExactMatch)
//!     .with_scorer(brevity)
//!     .run()
//!     .await?;
//! ```

pub mod classifier;
pub mod client;
pub mod embedding;
pub mod heuristic;
pub mod template;

// Re-exports for convenience
pub use classifier::{LlmClassifier, UnrecognizedLabel};
pub use client::{ChatClient, ChatMessage, ChatRequest, ChatRole, EmbeddingClient, ProxyChatClient};
pub use embedding::{cosine_similarity, EmbeddingSimilarity};
pub use heuristic::{ExactMatch, Levenshtein, NumericDiff};
pub use template::{render, TemplateError};
