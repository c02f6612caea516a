//! Stream invocation context
//!
//! A [`Context`] is the small key-value mapping a parent stream hands to each
//! of its children: `{"listId": 123}`, `{"messageMedium": "Email",
//! "templateId": 42}`. One context parameterizes exactly one child fetch loop
//! and is discarded when that loop completes.
//!
//! Contexts flow down a hierarchy by extension only: a child's context is the
//! union of its parent's context plus the keys the child level adds. Existing
//! keys are never overwritten.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Ordered key-value mapping passed to dependent stream invocations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: JsonObject,
}

impl Context {
    /// Create an empty context (used for root streams)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from an existing JSON object
    pub fn from_object(values: JsonObject) -> Self {
        Self { values }
    }

    /// Add a key, keeping any existing value for that key.
    ///
    /// Parent keys win: a level below a parent may only extend the mapping.
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.values.entry(key.into()).or_insert(value);
    }

    /// Builder-style [`Context::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Clone this context as the base for a child level
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(JsonValue::as_str)
    }

    /// Get a required value, failing with a hierarchy misconfiguration error
    pub fn require(&self, stream: &str, key: &str) -> Result<&JsonValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::missing_context_key(stream, key))
    }

    /// Render a value as a URL query parameter string
    pub fn param(&self, stream: &str, key: &str) -> Result<String> {
        Ok(value_to_param(self.require(stream, key)?))
    }

    /// Whether the context carries any keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate keys and values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.values.iter()
    }

    /// The underlying JSON object
    pub fn as_object(&self) -> &JsonObject {
        &self.values
    }
}

/// Convert a scalar JSON value to its query-parameter form
pub fn value_to_param(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
