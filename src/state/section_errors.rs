//! Per-section validation flags used to mark tabs with errors

use super::forms::FormLayout;
use serde::{Deserialize, Serialize};

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted field path, e.g. `educations.0.school`
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Section the failure belongs to (first path segment)
    pub fn section(&self) -> &str {
        self.path.split('.').next().unwrap_or_default()
    }
}

/// Section id -> "has at least one error", keyed by every declared section
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionErrorMap {
    flags: Vec<(String, bool)>,
}

impl SectionErrorMap {
    /// All declared sections flagged `false`
    pub fn clean(layout: &FormLayout) -> Self {
        Self {
            flags: layout.ids().map(|id| (id.to_string(), false)).collect(),
        }
    }

    /// Flag for a section; None only for undeclared sections
    pub fn get(&self, section: &str) -> Option<bool> {
        self.flags
            .iter()
            .find(|(id, _)| id == section)
            .map(|(_, flagged)| *flagged)
    }

    pub fn has_errors(&self) -> bool {
        self.flags.iter().any(|(_, flagged)| *flagged)
    }

    /// Flagged section ids in declaration order
    pub fn flagged(&self) -> Vec<&str> {
        self.flags
            .iter()
            .filter(|(_, flagged)| *flagged)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(id, flagged)| (id.as_str(), *flagged))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Rebuilds the [`SectionErrorMap`] from raw failures on every validation pass
#[derive(Debug, Clone)]
pub struct SectionErrorAggregator {
    layout: FormLayout,
    current: SectionErrorMap,
}

impl SectionErrorAggregator {
    pub fn new(layout: FormLayout) -> Self {
        let current = SectionErrorMap::clean(&layout);
        Self { layout, current }
    }

    /// Build a fresh map from `failures`
    pub fn aggregate(&self, failures: &[FieldError]) -> SectionErrorMap {
        for failure in failures {
            if self.layout.get(failure.section()).is_none() {
                tracing::warn!("Validation failure outside declared sections: {}", failure.path);
            }
        }

        let map = SectionErrorMap {
            flags: self
                .layout
                .ids()
                .map(|id| {
                    let flagged = failures.iter().any(|f| f.section() == id);
                    (id.to_string(), flagged)
                })
                .collect(),
        };
        debug_assert!(
            self.layout.ids().all(|id| map.get(id).is_some()),
            "section error map is missing a declared section"
        );
        map
    }

    /// Replace the current map. Returns true if the flags changed.
    pub fn recompute(&mut self, failures: &[FieldError]) -> bool {
        let next = self.aggregate(failures);
        if next == self.current {
            return false;
        }
        tracing::debug!(flagged = ?next.flagged(), "Section error flags changed");
        self.current = next;
        true
    }

    pub fn clear(&mut self) {
        self.current = SectionErrorMap::clean(&self.layout);
    }

    pub fn current(&self) -> &SectionErrorMap {
        &self.current
    }
}
