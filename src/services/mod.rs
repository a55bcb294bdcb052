//! Collaborators of the form session and their production implementations

mod localize;
mod log;
mod signals;
mod store;
mod traits;
mod validation;

pub use localize::Catalog;
pub use log::{LogNavigator, LogNotifier};
pub use signals::SessionSignals;
pub use store::FileProfileStore;
pub use traits::{
    FormValidator, Localizer, Navigator, Notification, NotificationKind, Notifier, ProfileStore,
    Signal, SignalStore, Transition, TransitionPayload,
};
pub use validation::{Rule, RuleValidator};

#[cfg(test)]
pub use traits::{MockFormValidator, MockProfileStore};
