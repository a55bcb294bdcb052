//! Trait abstractions for the session's collaborators to enable mocking in tests

use crate::error::ServiceError;
use crate::state::{FieldError, FormState};
use async_trait::async_trait;

/// Persists profile values
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the saved values
    async fn load(&self) -> Result<FormState, ServiceError>;

    /// Persist values. Not assumed idempotent; never retried here.
    async fn save(&self, values: &FormState) -> Result<(), ServiceError>;
}

/// Validates a whole form state (required fields, date ordering, remote checks)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormValidator: Send + Sync {
    async fn validate(&self, state: &FormState) -> Result<Vec<FieldError>, ServiceError>;
}

/// State handed to the next screen along with a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionPayload {
    /// The previous screen saved successfully right before leaving
    pub just_saved: bool,
}

/// A navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub path: String,
    pub payload: TransitionPayload,
}

impl Transition {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload: TransitionPayload::default(),
        }
    }

    pub fn with_payload(mut self, payload: TransitionPayload) -> Self {
        self.payload = payload;
        self
    }
}

/// Fire-and-forget router
pub trait Navigator: Send + Sync {
    fn navigate(&self, transition: Transition);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A user-facing toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Extra lines shown under the message
    pub description: Vec<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Vec<String>) -> Self {
        self.description = description;
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Translation lookup
pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str) -> String;
}

/// Signals observed by a different screen after navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    JustSaved,
}

/// Store for cross-screen signals, scoped to whoever shares the instance
pub trait SignalStore: Send + Sync {
    fn set(&self, signal: Signal);
    fn clear(&self, signal: Signal);
    fn is_set(&self, signal: Signal) -> bool;
}
