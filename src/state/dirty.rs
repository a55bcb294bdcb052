//! Unsaved-changes tracking against the last saved baseline

use super::forms::FormState;
use super::normalize::normalize;

/// Compares the current form state with the baseline under normalized equality
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    /// Always stored normalized
    baseline: FormState,
    dirty: bool,
}

impl DirtyTracker {
    pub fn new(baseline: &FormState) -> Self {
        let mut tracker = Self::default();
        tracker.initialize(baseline);
        tracker
    }

    /// Set the baseline loaded at session start
    pub fn initialize(&mut self, baseline: &FormState) {
        self.baseline = normalize(baseline);
        self.dirty = false;
    }

    /// Recompute and cache the dirty flag
    pub fn recompute(&mut self, current: &FormState) -> bool {
        self.dirty = normalize(current) != self.baseline;
        tracing::debug!(dirty = self.dirty, "Recomputed unsaved changes");
        self.dirty
    }

    /// Replace the baseline after a confirmed persist
    pub fn commit(&mut self, new_baseline: &FormState) {
        self.baseline = normalize(new_baseline);
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn baseline(&self) -> &FormState {
        &self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SubEntry;
    use pretty_assertions::assert_eq;

    fn loaded() -> FormState {
        FormState::new().with_entries(
            "educations",
            vec![SubEntry::from_pairs([("school", "UBC"), ("diploma", "")])],
        )
    }

    #[test]
    fn test_clean_after_initialize() {
        let mut tracker = DirtyTracker::new(&loaded());
        assert!(!tracker.is_dirty());
        assert!(!tracker.recompute(&loaded()));
    }

    #[test]
    fn test_baseline_is_stored_normalized() {
        let tracker = DirtyTracker::new(&loaded());
        let expected = FormState::new().with_entries(
            "educations",
            vec![SubEntry::from_pairs([("school", "UBC")])],
        );
        assert_eq!(tracker.baseline(), &expected);
    }

    #[test]
    fn test_dirty_after_real_edit() {
        let mut tracker = DirtyTracker::new(&loaded());
        let mut edited = loaded();
        edited.set_field("educations", 0, "school", "SFU");
        assert!(tracker.recompute(&edited));
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_blank_edit_is_not_dirty() {
        let mut tracker = DirtyTracker::new(&loaded());
        let mut edited = loaded();
        edited.set_field("educations", 0, "endDate", "");
        edited.add_entry(&crate::state::SectionSpec::new("experiences", "experience", "experience", 10));
        assert!(!tracker.recompute(&edited));
    }

    #[test]
    fn test_commit_clears_dirty() {
        let mut tracker = DirtyTracker::new(&loaded());
        let mut edited = loaded();
        edited.set_field("educations", 0, "school", "SFU");
        assert!(tracker.recompute(&edited));

        tracker.commit(&edited);
        assert!(!tracker.is_dirty());
        assert!(!tracker.recompute(&edited));
        assert!(tracker.recompute(&loaded()));
    }
}
