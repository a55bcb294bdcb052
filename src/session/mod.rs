//! Editing sessions: save flows and the coordinator that owns session state

mod coordinator;
mod save_flow;

pub use coordinator::{FormSessionCoordinator, LeaveDecision};
pub use save_flow::{SaveFlow, SaveFlowResult};

use crate::services::{FormValidator, Localizer, Navigator, Notifier, ProfileStore, SignalStore};
use std::sync::Arc;

/// Whether the profile is being created (onboarding) or edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    Create,
    #[default]
    Edit,
}

impl SessionMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

/// Collaborators one session talks to
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn ProfileStore>,
    pub validator: Arc<dyn FormValidator>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub localizer: Arc<dyn Localizer>,
    pub signals: Arc<dyn SignalStore>,
}
