//! Task under evaluation and its per-record side channel
//!
//! A task turns a record's input into an output, optionally writing
//! metadata and recording spans through [`TaskHooks`]. Closures come in
//! through two explicit constructors: [`task_fn`] for `input -> output`
//! and [`task_fn_with_hooks`] for closures that also take the hooks.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::dataset::JsonMap;
use crate::trace::{Span, Trace};

/// Per-record mutable side channel handed to the task
///
/// Seeded from the record's metadata and scoped strictly to one record's
/// execution: mutations are visible to that record's scorers and never
/// shared across records. Clones share the same underlying state so the
/// handle can move into the task's future while the harness keeps one to
/// read back afterwards.
#[derive(Debug, Clone, Default)]
pub struct TaskHooks {
    inner: Arc<Mutex<HooksInner>>,
}

#[derive(Debug, Default)]
struct HooksInner {
    metadata: JsonMap,
    spans: Vec<Span>,
}

impl TaskHooks {
    /// Create hooks seeded with the record's metadata
    pub fn new(metadata: JsonMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HooksInner {
                metadata,
                spans: Vec::new(),
            })),
        }
    }

    /// Write a metadata entry
    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.lock().metadata.insert(key.into(), value.into());
    }

    /// Read a metadata entry
    pub fn metadata_value(&self, key: &str) -> Option<Value> {
        self.inner.lock().metadata.get(key).cloned()
    }

    /// Snapshot of the current metadata map
    pub fn metadata(&self) -> JsonMap {
        self.inner.lock().metadata.clone()
    }

    /// Record a span for trace-aware scorers
    pub fn record_span(&self, span: Span) {
        self.inner.lock().spans.push(span);
    }

    /// Shorthand for recording a tool-call span
    pub fn record_tool_call(&self, name: impl Into<String>) {
        self.record_span(Span::tool(name));
    }

    /// Freeze the recorded state into (metadata snapshot, trace handle)
    pub(crate) fn freeze(&self) -> (JsonMap, Trace) {
        let inner = self.inner.lock();
        (inner.metadata.clone(), Trace::new(inner.spans.clone()))
    }
}

/// The function under evaluation
#[async_trait]
pub trait Task: Send + Sync {
    /// Produce an output from a record's input
    ///
    /// Errors are recorded against the record and excluded from scoring;
    /// they never abort the overall evaluation.
    async fn run(&self, input: Value, hooks: TaskHooks) -> anyhow::Result<Value>;
}

/// Task built from an `input -> output` closure
pub struct FnTask<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Task for FnTask<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn run(&self, input: Value, _hooks: TaskHooks) -> anyhow::Result<Value> {
        (self.f)(input).await
    }
}

/// Task built from an `(input, hooks) -> output` closure
pub struct HookedFnTask<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Task for HookedFnTask<F>
where
    F: Fn(Value, TaskHooks) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn run(&self, input: Value, hooks: TaskHooks) -> anyhow::Result<Value> {
        (self.f)(input, hooks).await
    }
}

/// Wrap an async `input -> output` closure as a [`Task`]
pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    FnTask { f }
}

/// Wrap an async `(input, hooks) -> output` closure as a [`Task`]
pub fn task_fn_with_hooks<F, Fut>(f: F) -> HookedFnTask<F>
where
    F: Fn(Value, TaskHooks) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    HookedFnTask { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_task_fn_ignores_hooks() {
        let task = task_fn(|input| async move { Ok(input) });
        let hooks = TaskHooks::default();
        let output = task.run(json!("foo"), hooks.clone()).await.unwrap();

        assert_eq!(output, json!("foo"));
        assert!(hooks.metadata().is_empty());
    }

    #[tokio::test]
    async fn test_hooked_task_writes_metadata() {
        let task = task_fn_with_hooks(|input, hooks: TaskHooks| async move {
            hooks.set_metadata("result", input.clone());
            Ok(input)
        });

        let hooks = TaskHooks::new(JsonMap::new());
        task.run(json!("foo"), hooks.clone()).await.unwrap();

        assert_eq!(hooks.metadata_value("result"), Some(json!("foo")));
    }

    #[tokio::test]
    async fn test_hooks_seeded_from_record_metadata() {
        let mut seed = JsonMap::new();
        seed.insert("next".to_string(), json!("bar"));

        let hooks = TaskHooks::new(seed);
        hooks.record_tool_call("escalate");

        let (metadata, trace) = hooks.freeze();
        assert_eq!(metadata.get("next"), Some(&json!("bar")));
        assert!(trace.tool_was_called("escalate"));
    }
}
