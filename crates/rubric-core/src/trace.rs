//! Execution traces for trace-aware scorers
//!
//! A task can record a hierarchical span record of its sub-operations
//! (tool calls, model calls) through its [`TaskHooks`](crate::task::TaskHooks).
//! After the task finishes, the harness freezes the spans into a [`Trace`]
//! handle and passes it only to scorers that declare the `trace` field.
//! The harness never interprets span contents; it only plumbs the handle
//! through.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::JsonMap;

/// Kind tag used to filter spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Top-level task execution
    Task,
    /// Model invocation
    Llm,
    /// Tool invocation
    Tool,
    /// Anything else
    Other,
}

/// One recorded sub-operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Kind tag for filtering
    pub kind: SpanKind,

    /// Span name (e.g. the tool name)
    pub name: String,

    /// Arbitrary span attributes
    #[serde(default)]
    pub attributes: JsonMap,

    /// Nested spans
    #[serde(default)]
    pub children: Vec<Span>,
}

impl Span {
    /// Create a span with a kind and name
    pub fn new(kind: SpanKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: JsonMap::new(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a tool-call span
    pub fn tool(name: impl Into<String>) -> Self {
        Self::new(SpanKind::Tool, name)
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a child span
    pub fn with_child(mut self, child: Span) -> Self {
        self.children.push(child);
        self
    }

    /// Read an attribute by key
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// Read-only queryable handle over the spans recorded during one task run
///
/// Cheap to clone; the span tree is shared. An empty trace reads the same
/// as "nothing was called": all queries return empty results.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    spans: Arc<Vec<Span>>,
}

impl Trace {
    /// Freeze a span list into a trace handle
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans: Arc::new(spans),
        }
    }

    /// Top-level spans in recording order
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// All spans of the given kind, flattening the hierarchy depth-first
    pub fn spans_of_kind(&self, kind: SpanKind) -> Vec<&Span> {
        let mut found = Vec::new();
        for span in self.spans.iter() {
            collect_of_kind(span, kind, &mut found);
        }
        found
    }

    /// Whether any tool span with the given name was recorded
    ///
    /// Name comparison is case-sensitive. Missing spans and missing
    /// attributes both read as "not called".
    pub fn tool_was_called(&self, name: &str) -> bool {
        self.spans_of_kind(SpanKind::Tool)
            .iter()
            .any(|span| span.name == name)
    }

    /// Whether the trace recorded anything at all
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn collect_of_kind<'a>(span: &'a Span, kind: SpanKind, found: &mut Vec<&'a Span>) {
    if span.kind == kind {
        found.push(span);
    }
    for child in &span.children {
        collect_of_kind(child, kind, found);
    }
}
