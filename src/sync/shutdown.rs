//! One-way shutdown signal for background threads.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Latching flag that threads can sleep on.
///
/// Once triggered it stays triggered. Sleepers in
/// [`sleep_unless_triggered`](Self::sleep_unless_triggered) wake early
/// when it fires.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    triggered: Mutex<bool>,
    changed: Condvar,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            triggered: Mutex::new(false),
            changed: Condvar::new(),
        }
    }

    /// Triggers the signal and wakes every sleeper.
    pub fn trigger(&self) {
        *self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        self.changed.notify_all();
    }

    /// Returns whether the signal has been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for up to `timeout`.
    ///
    /// Returns `true` if the signal was (or became) triggered, `false` if the
    /// full timeout elapsed first.
    pub fn sleep_unless_triggered(&self, timeout: Duration) -> bool {
        let guard = self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}
