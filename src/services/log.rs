//! Navigator and notifier that report through tracing (used by the binary)

use super::traits::{Navigator, Notification, NotificationKind, Notifier, Transition};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, transition: Transition) {
        tracing::info!(
            just_saved = transition.payload.just_saved,
            "Navigate to {}",
            transition.path
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let details = notification.description.join(" ");
        match notification.kind {
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!("{} {}", notification.message, details)
            }
            NotificationKind::Warning => tracing::warn!("{} {}", notification.message, details),
            NotificationKind::Error => tracing::error!("{} {}", notification.message, details),
        }
    }
}
