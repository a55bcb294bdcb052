//! Per-session state holder wiring dirty tracking, section errors and saves

use super::save_flow::{section_transition, SaveFlow, SaveFlowController, SaveFlowResult};
use super::{Services, SessionMode};
use crate::config::WorkflowRoutes;
use crate::error::ServiceError;
use crate::services::{Notification, NotificationKind};
use crate::state::{
    DirtyTracker, FieldError, FormLayout, FormState, SectionErrorAggregator, SectionErrorMap,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Mutable state of one editing session
#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) layout: FormLayout,
    pub(crate) form: FormState,
    pub(crate) tracker: DirtyTracker,
    pub(crate) errors: SectionErrorAggregator,
    /// Id of the displayed section
    pub(crate) active: String,
}

impl SessionState {
    fn new(layout: FormLayout, initial: FormState, tab_hint: Option<&str>) -> Self {
        let active = tab_hint
            .and_then(|tab| layout.find_by_tab(tab))
            .unwrap_or_else(|| layout.first())
            .id
            .clone();
        let mut form = initial;
        if form.enforce_limits(&layout) {
            tracing::warn!("Loaded values exceed section limits; extra entries dropped");
        }
        Self {
            tracker: DirtyTracker::new(&form),
            errors: SectionErrorAggregator::new(layout.clone()),
            form,
            layout,
            active,
        }
    }

    pub(crate) fn refresh_dirty(&mut self) -> bool {
        self.tracker.recompute(&self.form)
    }

    /// Move to the next section. Returns its tab name, or None on the last one.
    pub(crate) fn advance(&mut self) -> Option<String> {
        let next = self.layout.next_after(&self.active)?;
        let tab = next.tab.clone();
        self.active = next.id.clone();
        Some(tab)
    }

    /// Replace form and baseline with freshly loaded values
    pub(crate) fn replace_all(&mut self, mut fresh: FormState) {
        fresh.enforce_limits(&self.layout);
        self.tracker.initialize(&fresh);
        self.form = fresh;
        self.errors.clear();
    }
}

pub(crate) fn lock_state(session: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What to do when the user tries to leave the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    Proceed,
    /// Ask the user with this message before leaving
    Confirm(String),
}

/// One editing session of the multi-section form
pub struct FormSessionCoordinator {
    id: Uuid,
    mode: SessionMode,
    state: Mutex<SessionState>,
    flows: SaveFlowController,
}

impl FormSessionCoordinator {
    pub fn new(
        mode: SessionMode,
        layout: FormLayout,
        initial: FormState,
        tab_hint: Option<&str>,
        routes: WorkflowRoutes,
        services: Services,
    ) -> Self {
        let id = Uuid::new_v4();
        let state = SessionState::new(layout, initial, tab_hint);
        tracing::info!(
            session = %id,
            mode = mode.label(),
            active = %state.active,
            "Form session started"
        );
        Self {
            id,
            mode,
            state: Mutex::new(state),
            flows: SaveFlowController::new(services, routes, mode),
        }
    }

    /// Start a session with the values currently held by the store
    pub async fn load(
        mode: SessionMode,
        layout: FormLayout,
        tab_hint: Option<&str>,
        routes: WorkflowRoutes,
        services: Services,
    ) -> Result<Self, ServiceError> {
        let initial = services.store.load().await?;
        Ok(Self::new(mode, layout, initial, tab_hint, routes, services))
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Raw values changed (every keystroke or blur). Returns the dirty flag.
    pub fn on_fields_changed(&self, raw: FormState) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        state.form = raw;
        if state.form.enforce_limits(&state.layout) {
            tracing::warn!(session = %self.id, "Dropped entries beyond section limits");
        }
        state.refresh_dirty()
    }

    /// Apply an in-place edit to the form values. Returns the dirty flag.
    pub fn edit<F: FnOnce(&mut FormState)>(&self, apply: F) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        apply(&mut state.form);
        if state.form.enforce_limits(&state.layout) {
            tracing::warn!(session = %self.id, "Dropped entries beyond section limits");
        }
        state.refresh_dirty()
    }

    /// Append a blank entry. No-op once the section is full or unknown.
    pub fn add_entry(&self, section: &str) -> bool {
        let mut state = self.state();
        let Some(spec) = state.layout.get(section).cloned() else {
            tracing::warn!(session = %self.id, "Unknown section: {}", section);
            return false;
        };
        if !state.form.add_entry(&spec) {
            tracing::debug!(session = %self.id, "Section {} is full", section);
            return false;
        }
        state.refresh_dirty();
        true
    }

    pub fn remove_entry(&self, section: &str, index: usize) -> bool {
        let mut state = self.state();
        if state.form.remove_entry(section, index).is_none() {
            return false;
        }
        state.refresh_dirty();
        true
    }

    /// Structural validation finished. Returns true if the tab flags changed.
    pub fn on_validation_pass(&self, failures: &[FieldError]) -> bool {
        self.state().errors.recompute(failures)
    }

    /// Run the validator over the current values and update the tab flags
    pub async fn validate(&self) -> Result<SectionErrorMap, ServiceError> {
        let snapshot = self.form_state();
        let failures = self.flows.services().validator.validate(&snapshot).await?;
        let mut state = self.state();
        state.errors.recompute(&failures);
        Ok(state.errors.current().clone())
    }

    /// Show another section and publish it in the URL
    pub fn switch_section(&self, section: &str) -> bool {
        let tab = {
            let mut state = self.state();
            let (id, tab) = match state.layout.get(section) {
                Some(spec) => (spec.id.clone(), spec.tab.clone()),
                None => {
                    tracing::warn!(session = %self.id, "Unknown section: {}", section);
                    return false;
                }
            };
            state.active = id;
            tab
        };
        self.flows
            .services()
            .navigator
            .navigate(section_transition(self.flows.routes(), self.mode, &tab));
        true
    }

    /// Restore the last saved values
    pub fn reset(&self) {
        {
            let mut state = self.state();
            let baseline = state.tracker.baseline().clone();
            state.form = baseline;
            state.errors.clear();
            state.refresh_dirty();
        }
        tracing::info!(session = %self.id, "Form reset");
        let services = self.flows.services();
        services.notifier.notify(Notification::new(
            NotificationKind::Info,
            services.localizer.localize("form.clear"),
        ));
    }

    pub fn should_warn_before_leaving(&self) -> bool {
        self.state().tracker.is_dirty()
    }

    /// Navigation-interrupt guard
    pub fn guard_leave(&self) -> LeaveDecision {
        if self.should_warn_before_leaving() {
            LeaveDecision::Confirm(self.flows.services().localizer.localize("form.unsaved.alert"))
        } else {
            LeaveDecision::Proceed
        }
    }

    /// Leave without saving; unsaved values are dropped with the session
    pub fn discard(self) {
        tracing::info!(
            session = %self.id,
            dirty = self.should_warn_before_leaving(),
            "Form session discarded"
        );
    }

    pub async fn save(&self) -> SaveFlowResult {
        self.flows.run(SaveFlow::Save, &self.state).await
    }

    pub async fn save_and_advance(&self) -> SaveFlowResult {
        self.flows.run(SaveFlow::SaveAndAdvance, &self.state).await
    }

    pub async fn save_and_finish(&self) -> SaveFlowResult {
        self.flows.run(SaveFlow::SaveAndFinish, &self.state).await
    }

    pub fn save_in_flight(&self) -> bool {
        self.flows.in_flight()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn active_section(&self) -> String {
        self.state().active.clone()
    }

    pub fn section_errors(&self) -> SectionErrorMap {
        self.state().errors.current().clone()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.should_warn_before_leaving()
    }

    pub fn form_state(&self) -> FormState {
        self.state().form.clone()
    }

    pub fn layout(&self) -> FormLayout {
        self.state().layout.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockFormValidator, MockProfileStore, Transition};
    use crate::session::fixtures::{loaded_profile, services, Event, FixedValidator, Recorder};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn coordinator(tab: Option<&str>) -> (FormSessionCoordinator, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut store = MockProfileStore::new();
        store.expect_save().never();
        let session = FormSessionCoordinator::new(
            SessionMode::Edit,
            FormLayout::default(),
            loaded_profile(),
            tab,
            WorkflowRoutes::default(),
            services(
                Arc::new(store),
                Arc::new(FixedValidator(Vec::new())),
                &recorder,
            ),
        );
        (session, recorder)
    }

    mod active_section {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_defaults_to_first() {
            let (session, _) = coordinator(None);
            assert_eq!(session.active_section(), "educations");
        }

        #[test]
        fn test_hint_selects_tab() {
            let (session, _) = coordinator(Some("experience"));
            assert_eq!(session.active_section(), "experiences");
        }

        #[test]
        fn test_unknown_hint_falls_back() {
            let (session, _) = coordinator(Some("skills"));
            assert_eq!(session.active_section(), "educations");
        }

        #[test]
        fn test_switch_section_publishes_url() {
            let (session, recorder) = coordinator(None);
            assert!(session.switch_section("experiences"));
            assert_eq!(session.active_section(), "experiences");
            assert_eq!(
                recorder.navigations(),
                vec![Transition::to("/profile/edit/qualifications?tab=experience")]
            );
        }

        #[test]
        fn test_switch_to_unknown_is_rejected() {
            let (session, recorder) = coordinator(None);
            assert!(!session.switch_section("skills"));
            assert_eq!(session.active_section(), "educations");
            assert!(recorder.events().is_empty());
        }
    }

    mod dirty_tracking {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_clean_at_start() {
            let (session, _) = coordinator(None);
            assert!(!session.has_unsaved_changes());
            assert_eq!(session.guard_leave(), LeaveDecision::Proceed);
        }

        #[test]
        fn test_fields_changed_marks_dirty() {
            let (session, _) = coordinator(None);
            let mut raw = loaded_profile();
            raw.set_field("experiences", 0, "header", "Manager");
            assert!(session.on_fields_changed(raw));
            assert!(session.should_warn_before_leaving());
            assert_eq!(
                session.guard_leave(),
                LeaveDecision::Confirm("form.unsaved.alert".to_string())
            );
        }

        #[test]
        fn test_changing_back_is_clean() {
            let (session, _) = coordinator(None);
            let mut raw = loaded_profile();
            raw.set_field("experiences", 0, "header", "Manager");
            session.on_fields_changed(raw);
            assert!(!session.on_fields_changed(loaded_profile()));
        }

        #[test]
        fn test_blank_added_entry_is_not_a_change() {
            let (session, _) = coordinator(None);
            assert!(session.add_entry("educations"));
            assert!(!session.has_unsaved_changes());
        }

        #[test]
        fn test_cleared_slot_counts_as_removal() {
            let (session, _) = coordinator(None);
            let changed = session.edit(|form| {
                form.set_field("educations", 0, "school", serde_json::Value::Null);
                form.set_field("educations", 0, "diploma", serde_json::Value::Null);
                form.set_field("educations", 0, "startDate", serde_json::Value::Null);
            });
            assert!(changed);

            // Same as physically removing the entry
            let (removed, _) = coordinator(None);
            removed.remove_entry("educations", 0);
            let mut cleared = session.form_state();
            assert!(crate::state::normalized_eq(&cleared, &removed.form_state()));
            cleared.remove_entry("educations", 0);
            assert_eq!(cleared, removed.form_state());
        }

        #[test]
        fn test_add_entry_respects_limit() {
            let (session, _) = coordinator(None);
            assert!(session.add_entry("educations"));
            assert!(session.add_entry("educations"));
            assert!(!session.add_entry("educations"));
            assert_eq!(session.form_state().entry_count("educations"), 3);
        }

        #[test]
        fn test_add_entry_unknown_section() {
            let (session, _) = coordinator(None);
            assert!(!session.add_entry("skills"));
        }

        #[test]
        fn test_remove_entry_marks_dirty() {
            let (session, _) = coordinator(None);
            assert!(session.remove_entry("experiences", 0));
            assert!(session.has_unsaved_changes());
            assert!(!session.remove_entry("experiences", 0));
        }

        #[test]
        fn test_fields_changed_enforces_limits() {
            let (session, _) = coordinator(None);
            let raw = FormState::new().with_entries(
                "educations",
                (0..5)
                    .map(|i| crate::state::SubEntry::from_pairs([("school", format!("S{i}"))]))
                    .collect(),
            );
            session.on_fields_changed(raw);
            assert_eq!(session.form_state().entry_count("educations"), 3);
        }

        #[test]
        fn test_edit_enforces_limits() {
            let (session, _) = coordinator(None);
            let roomy = crate::state::SectionSpec::new("educations", "education", "education", 10);
            session.edit(|form| {
                for i in 0..4 {
                    form.add_entry(&roomy);
                    form.set_field("educations", i + 1, "school", format!("S{i}"));
                }
            });
            assert_eq!(session.form_state().entry_count("educations"), 3);
            assert!(session.has_unsaved_changes());
        }
    }

    mod section_errors {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_starts_clean() {
            let (session, _) = coordinator(None);
            let errors = session.section_errors();
            assert_eq!(errors.get("educations"), Some(false));
            assert_eq!(errors.get("experiences"), Some(false));
        }

        #[test]
        fn test_validation_pass_flags_tabs() {
            let (session, _) = coordinator(None);
            let failures = [FieldError::new("educations.0.school", "required")];
            assert!(session.on_validation_pass(&failures));
            assert_eq!(session.section_errors().get("educations"), Some(true));
            assert_eq!(session.section_errors().get("experiences"), Some(false));
            let same_section = [FieldError::new("educations.0.diploma", "required")];
            assert!(!session.on_validation_pass(&same_section));
        }

        #[tokio::test]
        async fn test_validate_runs_validator() {
            let recorder = Arc::new(Recorder::default());
            let mut validator = MockFormValidator::new();
            validator
                .expect_validate()
                .times(1)
                .returning(|_| Ok(vec![FieldError::new("experiences.0.endDate", "order")]));
            let session = FormSessionCoordinator::new(
                SessionMode::Edit,
                FormLayout::default(),
                loaded_profile(),
                None,
                WorkflowRoutes::default(),
                services(Arc::new(MockProfileStore::new()), Arc::new(validator), &recorder),
            );

            let errors = session.validate().await.unwrap();
            assert_eq!(errors.flagged(), vec!["experiences"]);
            assert_eq!(session.section_errors(), errors);
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reset_restores_baseline_and_notifies() {
            let (session, recorder) = coordinator(None);
            session.edit(|form| {
                form.set_field("educations", 0, "school", "SFU");
            });
            session.on_validation_pass(&[FieldError::new("educations.0.diploma", "required")]);

            session.reset();

            assert!(!session.has_unsaved_changes());
            assert!(!session.section_errors().has_errors());
            assert_eq!(session.form_state(), loaded_profile());
            assert_eq!(
                recorder.events(),
                vec![Event::Notified(
                    Notification::new(NotificationKind::Info, "form.clear"),
                    false
                )]
            );
        }
    }

    #[tokio::test]
    async fn test_load_uses_store_values() {
        let recorder = Arc::new(Recorder::default());
        let mut store = MockProfileStore::new();
        store.expect_load().times(1).returning(|| Ok(loaded_profile()));
        let session = FormSessionCoordinator::load(
            SessionMode::Create,
            FormLayout::default(),
            Some("experience"),
            WorkflowRoutes::default(),
            services(
                Arc::new(store),
                Arc::new(FixedValidator(Vec::new())),
                &recorder,
            ),
        )
        .await
        .unwrap();

        assert_eq!(session.mode(), SessionMode::Create);
        assert_eq!(session.form_state(), loaded_profile());
        assert_eq!(session.active_section(), "experiences");
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_discard_never_persists() {
        let (session, recorder) = coordinator(None);
        session.edit(|form| {
            form.set_field("educations", 0, "school", "SFU");
        });
        session.discard();
        assert!(recorder.events().is_empty());
    }
}
