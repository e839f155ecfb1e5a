//! Prompt template rendering
//!
//! Substitutes `{{variable}}` placeholders with fields from a JSON
//! context. Dotted paths descend into objects (`{{output.short_history}}`).
//! A placeholder that resolves to nothing is an error rather than an
//! empty substitution, so a typo in a classifier template fails loudly.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Template rendering failure
#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    /// A placeholder did not resolve against the context
    #[error("unknown template variable `{0}`")]
    UnknownVariable(String),
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("valid regex"))
}

/// Render a template against a JSON context
pub fn render(template: &str, context: &Value) -> Result<String, TemplateError> {
    let mut missing: Option<String> = None;
    let rendered = placeholder_re().replace_all(template, |caps: &regex::Captures| {
        let path = &caps[1];
        match lookup(context, path) {
            Some(value) => value_to_text(value),
            None => {
                missing.get_or_insert_with(|| path.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(path) => Err(TemplateError::UnknownVariable(path)),
        None => Ok(rendered.into_owned()),
    }
}

/// Resolve a dotted path against a JSON value
fn lookup<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    let value = path
        .split('.')
        .try_fold(context, |value, key| value.get(key))?;
    // An explicit null reads the same as a missing field
    (!value.is_null()).then_some(value)
}

/// Substitute strings raw; everything else as compact JSON
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
