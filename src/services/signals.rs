//! Session-scoped cross-screen signals
//!
//! The form screen and the screen it navigates to share one `SessionSignals`
//! through an `Arc`. Nothing here is process global.

use super::traits::{Signal, SignalStore};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct SessionSignals {
    set: Mutex<HashSet<Signal>>,
}

impl SessionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    fn signals(&self) -> MutexGuard<'_, HashSet<Signal>> {
        self.set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read and clear a signal in one step (used by the receiving screen)
    pub fn take(&self, signal: Signal) -> bool {
        self.signals().remove(&signal)
    }
}

impl SignalStore for SessionSignals {
    fn set(&self, signal: Signal) {
        self.signals().insert(signal);
    }

    fn clear(&self, signal: Signal) {
        self.signals().remove(&signal);
    }

    fn is_set(&self, signal: Signal) -> bool {
        self.signals().contains(&signal)
    }
}
