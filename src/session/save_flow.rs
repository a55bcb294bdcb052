//! Save flows: validate, persist, commit the baseline, then branch
//!
//! The three user-facing save buttons share one sequence and differ only in
//! what happens after a successful commit. Failures are turned into
//! notifications here and never escape to the caller as errors.

use super::coordinator::{lock_state, SessionState};
use super::{Services, SessionMode};
use crate::config::WorkflowRoutes;
use crate::error::{ServiceError, TransportError};
use crate::services::{Notification, NotificationKind, Signal, Transition, TransitionPayload};
use crate::state::{normalize, normalized_eq, FormState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Which save button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFlow {
    /// Save, refresh and confirm
    Save,
    /// Save and go to the next section, or leave the form after the last one
    SaveAndAdvance,
    /// Save and leave the form
    SaveAndFinish,
}

/// Outcome of one save flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFlowResult {
    Succeeded,
    /// Validation failed; ids of the sections holding errors
    ValidationFailed { sections: Vec<String> },
    TransportFailed(TransportError),
    /// Another save of this session committed while this one waited
    Busy,
}

impl SaveFlowResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

enum Failure {
    Validation,
    Transport(TransportError),
    Unrecognized(anyhow::Error),
}

impl From<ServiceError> for Failure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Transport(e) => Failure::Transport(e),
            ServiceError::Other(e) => Failure::Unrecognized(e),
        }
    }
}

/// Address of a section tab for the given mode
pub(crate) fn section_transition(
    routes: &WorkflowRoutes,
    mode: SessionMode,
    tab: &str,
) -> Transition {
    let form = match mode {
        SessionMode::Create => &routes.create_form,
        SessionMode::Edit => &routes.edit_form,
    };
    Transition::to(format!("{}?tab={}", form, tab))
}

/// Runs save flows for one session, one at a time
pub struct SaveFlowController {
    services: Services,
    routes: WorkflowRoutes,
    mode: SessionMode,
    flight: tokio::sync::Mutex<()>,
    /// Bumped on every baseline commit
    commits: AtomicU64,
}

impl SaveFlowController {
    pub fn new(services: Services, routes: WorkflowRoutes, mode: SessionMode) -> Self {
        Self {
            services,
            routes,
            mode,
            flight: tokio::sync::Mutex::new(()),
            commits: AtomicU64::new(0),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn routes(&self) -> &WorkflowRoutes {
        &self.routes
    }

    /// Whether a save is currently running
    pub fn in_flight(&self) -> bool {
        self.flight.try_lock().is_err()
    }

    pub(crate) async fn run(
        &self,
        flow: SaveFlow,
        session: &Mutex<SessionState>,
    ) -> SaveFlowResult {
        // Wait for the running flow to settle. If it committed while we waited,
        // this request was made against values that are now saved.
        let seen = self.commits.load(Ordering::SeqCst);
        let _flight = self.flight.lock().await;
        if self.commits.load(Ordering::SeqCst) != seen {
            tracing::warn!(?flow, "Save rejected: another save committed first");
            if flow == SaveFlow::SaveAndFinish {
                self.services.signals.clear(Signal::JustSaved);
            }
            self.notify(NotificationKind::Warning, "edit.save.problem", Vec::new());
            return SaveFlowResult::Busy;
        }

        match self.persist(session).await {
            Ok(saved) => {
                tracing::info!(?flow, "Profile saved");
                self.branch(flow, &saved, session).await;
                SaveFlowResult::Succeeded
            }
            Err(failure) => self.fail(flow, failure, session),
        }
    }

    /// validate -> persist -> commit. Returns the persisted values.
    async fn persist(&self, session: &Mutex<SessionState>) -> Result<FormState, Failure> {
        let snapshot = lock_state(session).form.clone();

        let failures = match self.services.validator.validate(&snapshot).await {
            Ok(failures) => failures,
            Err(ServiceError::Other(err)) => {
                // No pass completed, so earlier flags no longer describe the values
                lock_state(session).errors.clear();
                return Err(Failure::Unrecognized(err));
            }
            Err(err) => return Err(err.into()),
        };
        lock_state(session).errors.recompute(&failures);
        if !failures.is_empty() {
            return Err(Failure::Validation);
        }

        let payload = normalize(&snapshot);
        self.services.store.save(&payload).await?;

        let mut state = lock_state(session);
        state.tracker.commit(&payload);
        self.commits.fetch_add(1, Ordering::SeqCst);
        // Edits made while the save was in flight stay unsaved
        state.refresh_dirty();
        Ok(payload)
    }

    async fn branch(&self, flow: SaveFlow, saved: &FormState, session: &Mutex<SessionState>) {
        match flow {
            SaveFlow::Save => {
                self.reload(saved, session).await;
                self.notify(NotificationKind::Success, "edit.save.success", Vec::new());
            }
            SaveFlow::SaveAndAdvance => {
                let next_tab = lock_state(session).advance();
                let transition = match next_tab {
                    Some(tab) => section_transition(&self.routes, self.mode, &tab),
                    None => Transition::to(&self.routes.workflow_complete),
                };
                self.services.navigator.navigate(transition);
            }
            SaveFlow::SaveAndFinish => match self.mode {
                SessionMode::Create => {
                    self.services
                        .navigator
                        .navigate(Transition::to(&self.routes.create_next_step));
                }
                SessionMode::Edit => {
                    self.services.signals.set(Signal::JustSaved);
                    self.services.navigator.navigate(
                        Transition::to(&self.routes.edit_finish)
                            .with_payload(TransitionPayload { just_saved: true }),
                    );
                }
            },
        }
    }

    /// Re-read the saved values. Only replaces the form when the user has not
    /// edited it since the save started.
    async fn reload(&self, saved: &FormState, session: &Mutex<SessionState>) {
        match self.services.store.load().await {
            Ok(fresh) => {
                let mut state = lock_state(session);
                if normalized_eq(&state.form, saved) {
                    state.replace_all(fresh);
                } else {
                    tracing::debug!("Keeping edits made during save");
                }
            }
            Err(err) => tracing::warn!("Reload after save failed: {}", err),
        }
    }

    fn fail(
        &self,
        flow: SaveFlow,
        failure: Failure,
        session: &Mutex<SessionState>,
    ) -> SaveFlowResult {
        if flow == SaveFlow::SaveAndFinish {
            // Must be cleared before any error is shown
            self.services.signals.clear(Signal::JustSaved);
        }

        match failure {
            Failure::Transport(err) => {
                tracing::warn!(?flow, "Save failed in transport: {}", err);
                self.notify(
                    NotificationKind::Error,
                    "edit.save.network.error",
                    vec![err.message.clone()],
                );
                return SaveFlowResult::TransportFailed(err);
            }
            Failure::Unrecognized(err) => tracing::warn!(?flow, "Save failed: {:#}", err),
            Failure::Validation => {}
        }

        let (sections, labels) = {
            let state = lock_state(session);
            let sections: Vec<String> = state
                .errors
                .current()
                .flagged()
                .into_iter()
                .map(str::to_string)
                .collect();
            let labels: Vec<String> = sections
                .iter()
                .filter_map(|id| state.layout.get(id))
                .map(|spec| spec.label_key.clone())
                .collect();
            (sections, labels)
        };
        tracing::info!(?flow, ?sections, "Save blocked by validation");
        self.notify(
            NotificationKind::Error,
            "edit.save.error",
            self.error_description(&labels),
        );
        SaveFlowResult::ValidationFailed { sections }
    }

    fn error_description(&self, label_keys: &[String]) -> Vec<String> {
        let localizer = &self.services.localizer;
        let form = localizer.localize("form");
        std::iter::once(localizer.localize("edit.save.error.intro"))
            .chain(
                label_keys
                    .iter()
                    .map(|key| format!("- {} {}", localizer.localize(key), form)),
            )
            .collect()
    }

    fn notify(&self, kind: NotificationKind, key: &str, description: Vec<String>) {
        let message = self.services.localizer.localize(key);
        self.services
            .notifier
            .notify(Notification::new(kind, message).with_description(description));
    }
}
