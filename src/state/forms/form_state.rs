//! Form state management: declared sections and the editable section tree

use super::field::SubEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declaration of one tabbed section of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Field-path prefix of the section (e.g. `educations`)
    pub id: String,
    /// Tab name used in shareable URLs (e.g. `education`)
    pub tab: String,
    /// Localization key of the human readable section name
    pub label_key: String,
    /// Maximum number of sub-entries the section may hold
    pub max_entries: usize,
}

impl SectionSpec {
    pub fn new(id: &str, tab: &str, label_key: &str, max_entries: usize) -> Self {
        Self {
            id: id.to_string(),
            tab: tab.to_string(),
            label_key: label_key.to_string(),
            max_entries,
        }
    }
}

/// Ordered list of declared sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    sections: Vec<SectionSpec>,
}

impl FormLayout {
    /// Create a layout. Panics if no section is declared.
    pub fn new(sections: Vec<SectionSpec>) -> Self {
        assert!(!sections.is_empty(), "a form layout needs at least one section");
        Self { sections }
    }

    /// Education and experience tabs of the qualifications form
    pub fn qualifications(education_limit: usize, experience_limit: usize) -> Self {
        Self::new(vec![
            SectionSpec::new("educations", "education", "education", education_limit),
            SectionSpec::new("experiences", "experience", "experience", experience_limit),
        ])
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn first(&self) -> &SectionSpec {
        &self.sections[0]
    }

    /// Section following `id`, or None when `id` is the last one
    pub fn next_after(&self, id: &str) -> Option<&SectionSpec> {
        self.index_of(id).and_then(|i| self.sections.get(i + 1))
    }

    pub fn is_last(&self, id: &str) -> bool {
        self.index_of(id) == Some(self.sections.len() - 1)
    }

    /// Resolve a tab hint (e.g. a `?tab=` query value) to a section
    pub fn find_by_tab(&self, tab: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.tab == tab || s.id == tab)
    }
}

impl Default for FormLayout {
    fn default() -> Self {
        Self::qualifications(3, 10)
    }
}

/// Tree of named sections, each an ordered list of sub-entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState {
    sections: BTreeMap<String, Vec<SubEntry>>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder helper used when loading values
    pub fn with_entries(mut self, section: &str, entries: Vec<SubEntry>) -> Self {
        self.sections.insert(section.to_string(), entries);
        self
    }

    pub fn entries(&self, section: &str) -> &[SubEntry] {
        self.sections.get(section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry_count(&self, section: &str) -> usize {
        self.entries(section).len()
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &[SubEntry])> {
        self.sections
            .iter()
            .map(|(id, entries)| (id.as_str(), entries.as_slice()))
    }

    /// Append a blank sub-entry. No-op once the section is full.
    pub fn add_entry(&mut self, spec: &SectionSpec) -> bool {
        let entries = self.sections.entry(spec.id.clone()).or_default();
        if entries.len() >= spec.max_entries {
            return false;
        }
        entries.push(SubEntry::blank());
        true
    }

    pub fn remove_entry(&mut self, section: &str, index: usize) -> Option<SubEntry> {
        let entries = self.sections.get_mut(section)?;
        if index < entries.len() {
            Some(entries.remove(index))
        } else {
            None
        }
    }

    /// Set one field of an existing sub-entry
    pub fn set_field(
        &mut self,
        section: &str,
        index: usize,
        field: &str,
        value: impl Into<Value>,
    ) -> bool {
        match self
            .sections
            .get_mut(section)
            .and_then(|entries| entries.get_mut(index))
        {
            Some(entry) => {
                entry.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Drop entries beyond each declared section's maximum.
    /// Returns true if anything was truncated.
    pub fn enforce_limits(&mut self, layout: &FormLayout) -> bool {
        let mut truncated = false;
        for spec in layout.sections() {
            if let Some(entries) = self.sections.get_mut(&spec.id) {
                if entries.len() > spec.max_entries {
                    entries.truncate(spec.max_entries);
                    truncated = true;
                }
            }
        }
        truncated
    }

    pub(crate) fn from_sections(sections: BTreeMap<String, Vec<SubEntry>>) -> Self {
        Self { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn education(school: &str) -> SubEntry {
        SubEntry::from_pairs([("school", school), ("diploma", "BSc")])
    }

    mod form_layout {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_default_is_qualifications() {
            let layout = FormLayout::default();
            let ids: Vec<_> = layout.ids().collect();
            assert_eq!(ids, vec!["educations", "experiences"]);
            assert_eq!(layout.get("educations").unwrap().max_entries, 3);
            assert_eq!(layout.get("experiences").unwrap().max_entries, 10);
        }

        #[test]
        fn test_next_after_and_is_last() {
            let layout = FormLayout::default();
            assert_eq!(layout.next_after("educations").unwrap().id, "experiences");
            assert!(layout.next_after("experiences").is_none());
            assert!(layout.is_last("experiences"));
            assert!(!layout.is_last("educations"));
            assert!(!layout.is_last("unknown"));
        }

        #[test]
        fn test_find_by_tab_accepts_tab_or_id() {
            let layout = FormLayout::default();
            assert_eq!(layout.find_by_tab("experience").unwrap().id, "experiences");
            assert_eq!(layout.find_by_tab("educations").unwrap().id, "educations");
            assert!(layout.find_by_tab("skills").is_none());
        }

        #[test]
        #[should_panic]
        fn test_empty_layout_panics() {
            FormLayout::new(Vec::new());
        }
    }

    mod form_state {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_default_is_empty() {
            let state = FormState::default();
            assert_eq!(state.entry_count("educations"), 0);
            assert!(state.entries("educations").is_empty());
        }

        #[test]
        fn test_add_entry_until_limit() {
            let layout = FormLayout::default();
            let spec = layout.get("educations").unwrap();
            let mut state = FormState::new();
            for _ in 0..3 {
                assert!(state.add_entry(spec));
            }
            assert!(!state.add_entry(spec));
            assert_eq!(state.entry_count("educations"), 3);
        }

        #[test]
        fn test_remove_entry() {
            let mut state =
                FormState::new().with_entries("educations", vec![education("A"), education("B")]);
            let removed = state.remove_entry("educations", 0).unwrap();
            assert_eq!(removed.text("school"), Some("A"));
            assert_eq!(state.entries("educations")[0].text("school"), Some("B"));
            assert!(state.remove_entry("educations", 5).is_none());
            assert!(state.remove_entry("experiences", 0).is_none());
        }

        #[test]
        fn test_set_field() {
            let mut state = FormState::new().with_entries("educations", vec![education("A")]);
            assert!(state.set_field("educations", 0, "school", "B"));
            assert_eq!(state.entries("educations")[0].text("school"), Some("B"));
            assert!(!state.set_field("educations", 1, "school", "C"));
        }

        #[test]
        fn test_enforce_limits_truncates() {
            let layout = FormLayout::qualifications(1, 10);
            let mut state =
                FormState::new().with_entries("educations", vec![education("A"), education("B")]);
            assert!(state.enforce_limits(&layout));
            assert_eq!(state.entry_count("educations"), 1);
            assert!(!state.enforce_limits(&layout));
        }

        #[test]
        fn test_serde_shape() {
            let json = r#"{"educations":[{"school":"UBC"}],"experiences":[]}"#;
            let state: FormState = serde_json::from_str(json).unwrap();
            assert_eq!(state.entries("educations")[0].text("school"), Some("UBC"));
            assert_eq!(serde_json::to_string(&state).unwrap(), json);
        }
    }
}
