//! Normalization used for dirty checks and submission
//!
//! Blank values (null, empty string, `false`, empty arrays and objects) are
//! dropped at every level, and sub-entries left with no fields are removed.
//! Two states that only differ in blank fields or blank entries normalize to
//! equal values.

use super::forms::{FormState, SubEntry};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// True when a value carries no user data
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// True when a sub-entry has no non-blank field after normalization
pub fn is_empty_entry(entry: &SubEntry) -> bool {
    normalize_map(entry.fields()).is_empty()
}

/// Normalize an arbitrary value, returning None when it collapses to blank
pub fn normalize_value(value: &Value) -> Option<Value> {
    let normalized = match value {
        Value::Array(items) => Value::Array(items.iter().filter_map(normalize_value).collect()),
        Value::Object(map) => Value::Object(normalize_map(map)),
        other => other.clone(),
    };
    (!is_blank(&normalized)).then_some(normalized)
}

fn normalize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter_map(|(k, v)| normalize_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Normalize a whole form state
pub fn normalize(state: &FormState) -> FormState {
    let sections: BTreeMap<String, Vec<SubEntry>> = state
        .sections()
        .filter_map(|(id, entries)| {
            let kept: Vec<SubEntry> = entries
                .iter()
                .map(|entry| normalize_map(entry.fields()))
                .filter(|fields| !fields.is_empty())
                .map(SubEntry::from_fields)
                .collect();
            (!kept.is_empty()).then(|| (id.to_string(), kept))
        })
        .collect();
    FormState::from_sections(sections)
}

/// Value equality of two states after normalization
pub fn normalized_eq(a: &FormState, b: &FormState) -> bool {
    normalize(a) == normalize(b)
}
