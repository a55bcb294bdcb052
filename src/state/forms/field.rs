//! Sub-entry value objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One repeatable record inside a section (e.g. one education entry).
///
/// Field shapes are domain specific, so values are kept as JSON values keyed
/// by field name (`school`, `diploma`, `startDate`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubEntry {
    fields: Map<String, Value>,
}

impl SubEntry {
    /// Create a blank entry, as produced by the "add" button
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build an entry from `(name, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a field as text (returns None for missing or non-string fields)
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Set a field value; `Value::Null` marks the field as cleared
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Clear every field, leaving the slot in place
    pub fn clear(&mut self) {
        for value in self.fields.values_mut() {
            *value = Value::Null;
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
