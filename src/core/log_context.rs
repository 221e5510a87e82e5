//! Ambient context and context field extraction
//!
//! This module provides:
//! - `LogContext`: an ordered set of ambient key/value pairs, typically built
//!   per request (trace and span identifiers, tenant, user, ...)
//! - `ContextExtractor`: the keys a logger copies out of a context into every
//!   record, `traceID` and `spanID` first
//! - `ContextBinding`: how a derived logger obtains its context, either fresh
//!   from a supplier on every call or from a snapshot taken once

use super::field::{Field, Value};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Well-known key for the distributed trace identifier
pub const TRACE_ID_KEY: &str = "traceID";

/// Well-known key for the span identifier
pub const SPAN_ID_KEY: &str = "spanID";

/// Owned value stored in a [`LogContext`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Unknown,
}

impl FieldValue {
    /// Borrow as a field value for encoding
    #[inline]
    pub fn as_value(&self) -> Value<'_> {
        match self {
            FieldValue::String(s) => Value::Str(s),
            FieldValue::Int(i) => Value::Int(*i),
            FieldValue::Uint(u) => Value::Uint(*u),
            FieldValue::Float(f) => Value::Float(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Unknown => Value::Unknown,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value().fmt(f)
    }
}

impl From<Value<'_>> for FieldValue {
    fn from(value: Value<'_>) -> Self {
        match value {
            Value::Str(s) => FieldValue::String(s.to_string()),
            Value::Int(i) => FieldValue::Int(i),
            Value::Uint(u) => FieldValue::Uint(u),
            Value::Float(f) => FieldValue::Float(f),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Unknown => FieldValue::Unknown,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Ambient key/value pairs a logger can pull correlation fields from
///
/// Insertion order is preserved; inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    fields: Vec<(String, FieldValue)>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.add_field(key, value);
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Owned context field produced by a static snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ContextField {
    pub key: String,
    pub value: FieldValue,
}

impl ContextField {
    #[inline]
    pub fn as_field(&self) -> Field<'_> {
        Field {
            key: &self.key,
            value: self.value.as_value(),
        }
    }
}

/// Keys copied from a [`LogContext`] into each record
///
/// Always recognizes `traceID` and `spanID`, followed by any extra keys in the
/// order they were added. Keys missing from a context produce no field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextExtractor {
    keys: Vec<Cow<'static, str>>,
}

impl ContextExtractor {
    pub fn new() -> Self {
        Self {
            keys: vec![Cow::Borrowed(TRACE_ID_KEY), Cow::Borrowed(SPAN_ID_KEY)],
        }
    }

    /// Recognize an additional key; duplicates are ignored
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.add_key(key);
        self
    }

    pub fn add_key(&mut self, key: impl Into<Cow<'static, str>>) {
        let key = key.into();
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.as_ref())
    }

    /// Call `emit` once per recognized key present in `context`, in key order
    pub fn extract<'a>(&'a self, context: &'a LogContext, mut emit: impl FnMut(Field<'a>)) {
        for key in &self.keys {
            if let Some(value) = context.get(key) {
                emit(Field {
                    key: key.as_ref(),
                    value: value.as_value(),
                });
            }
        }
    }

    /// Extract once into owned fields
    pub fn snapshot(&self, context: &LogContext) -> Arc<[ContextField]> {
        let mut fields = Vec::new();
        self.extract(context, |field| {
            fields.push(ContextField {
                key: field.key.to_string(),
                value: field.value.into(),
            })
        });
        fields.into()
    }
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Supplier invoked on every enabled call of a dynamically bound logger
pub type ContextSupplier = Arc<dyn Fn() -> LogContext + Send + Sync>;

/// Where a logger's context fields come from
#[derive(Clone, Default)]
pub enum ContextBinding {
    /// No context fields
    #[default]
    None,
    /// Re-extract from a fresh context on every call
    Dynamic(ContextSupplier),
    /// Fields extracted once at bind time
    Static(Arc<[ContextField]>),
}

impl ContextBinding {
    pub fn is_none(&self) -> bool {
        matches!(self, ContextBinding::None)
    }

    /// Call `emit` for every context field of one record
    pub fn visit(&self, extractor: &ContextExtractor, mut emit: impl FnMut(&Field<'_>)) {
        match self {
            ContextBinding::None => {}
            ContextBinding::Dynamic(supplier) => {
                let context = supplier();
                extractor.extract(&context, |field| emit(&field));
            }
            ContextBinding::Static(fields) => {
                for field in fields.iter() {
                    emit(&field.as_field());
                }
            }
        }
    }
}

impl fmt::Debug for ContextBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextBinding::None => f.write_str("None"),
            ContextBinding::Dynamic(_) => f.write_str("Dynamic(..)"),
            ContextBinding::Static(fields) => f.debug_tuple("Static").field(fields).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(binding: &ContextBinding, extractor: &ContextExtractor) -> Vec<(String, String)> {
        let mut out = Vec::new();
        binding.visit(extractor, |field| {
            out.push((field.key.to_string(), field.value.to_string()))
        });
        out
    }

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_log_context_with_fields() {
        let ctx = LogContext::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);

        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get("username"), Some(&FieldValue::from("john_doe")));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_log_context_replaces_in_place() {
        let ctx = LogContext::new()
            .with_field("a", 1)
            .with_field("b", 2)
            .with_field("a", 3);

        let keys: Vec<_> = ctx.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(ctx.get("a"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_extractor_default_keys() {
        let extractor = ContextExtractor::new();
        let keys: Vec<_> = extractor.keys().collect();
        assert_eq!(keys, [TRACE_ID_KEY, SPAN_ID_KEY]);

        let extractor = extractor.with_key("requestID").with_key("traceID");
        assert_eq!(extractor.keys().count(), 3);
    }

    #[test]
    fn test_extract_follows_key_order_and_skips_absent() {
        let extractor = ContextExtractor::new().with_key("userID");
        let ctx = LogContext::new()
            .with_field("userID", 7)
            .with_field("unrelated", "x")
            .with_field(TRACE_ID_KEY, "trace123");

        let mut seen = Vec::new();
        extractor.extract(&ctx, |field| seen.push(field.key));
        assert_eq!(seen, ["traceID", "userID"]);
    }

    #[test]
    fn test_static_binding_is_a_snapshot() {
        let extractor = ContextExtractor::new();
        let ctx = LogContext::new().with_field(TRACE_ID_KEY, "static123");
        let binding = ContextBinding::Static(extractor.snapshot(&ctx));

        let first = collect(&binding, &extractor);
        let second = collect(&binding, &extractor);
        assert_eq!(first, [("traceID".to_string(), "static123".to_string())]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_dynamic_binding_calls_supplier_each_time() {
        use std::sync::atomic::{AtomicU64, Ordering};

        let counter = Arc::new(AtomicU64::new(0));
        let supplier_counter = Arc::clone(&counter);
        let binding = ContextBinding::Dynamic(Arc::new(move || {
            let n = supplier_counter.fetch_add(1, Ordering::Relaxed) + 1;
            LogContext::new().with_field(TRACE_ID_KEY, format!("dynamic{}", n))
        }));
        let extractor = ContextExtractor::new();

        assert_eq!(collect(&binding, &extractor)[0].1, "dynamic1");
        assert_eq!(collect(&binding, &extractor)[0].1, "dynamic2");
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_none_and_empty_bindings_yield_nothing() {
        let extractor = ContextExtractor::new();
        assert!(collect(&ContextBinding::None, &extractor).is_empty());

        let empty = ContextBinding::Dynamic(Arc::new(LogContext::new));
        assert!(collect(&empty, &extractor).is_empty());
    }
}
