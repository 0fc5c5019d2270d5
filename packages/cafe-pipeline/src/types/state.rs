//! The embedded client-state blob of a detail page.

use serde_json::{Map, Value};

/// Untyped key → value cache dumped from the host page.
///
/// Shape is only partially known, so every accessor is total: missing keys,
/// wrong types and nulls all come back as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawState {
    entries: Map<String, Value>,
}

impl RawState {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Wrap any JSON value. Non-objects become an empty state.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(entries) => Self { entries },
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Entries whose key starts with `prefix`, in document order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        self.entries.iter().filter(move |(k, _)| k.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Value> for RawState {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// First key of an object starting with `prefix`, with its value.
pub fn first_with_prefix<'a>(value: &'a Value, prefix: &str) -> Option<(&'a String, &'a Value)> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.starts_with(prefix))
}

/// String field, `None` for missing, null or non-string values.
pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str()
}

/// String field that is present and not blank.
pub fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    str_field(value, key).filter(|s| !s.trim().is_empty())
}

/// Number field, accepting JSON numbers or numeric strings.
pub fn f64_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
