//! Latest-wins handoff channel.
//!
//! A single-slot relay between one producer and one consumer. The producer
//! never blocks: every `send` overwrites whatever the consumer has not yet
//! taken. The consumer blocks in `receive` until the slot is occupied and
//! always gets the most recent value.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

/// Mutex-guarded single-slot conflating channel.
///
/// Values sent while no consumer is waiting are superseded by later sends,
/// so a consumer never observes a stale value. Only one concurrent consumer
/// is supported: with several blocked receivers, each `send` wakes exactly
/// one of them and which one is unspecified.
pub struct HandoffChannel<T> {
    /// Pending value, `None` once consumed.
    slot: Mutex<Option<T>>,
    /// Signalled when `slot` becomes occupied.
    ready: Condvar,
}

impl<T> HandoffChannel<T> {
    /// Creates an empty channel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Publishes `value`, replacing any value not yet received, and wakes
    /// at most one blocked receiver.
    pub fn send(&self, value: T) {
        let superseded = self.lock().replace(value).is_some();
        self.ready.notify_one();

        if superseded {
            trace!("handoff value superseded before it was received");
        }
    }

    /// Blocks until a value is available, then takes it.
    ///
    /// The slot is empty when this returns.
    pub fn receive(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`receive`](Self::receive), but gives up after `timeout`.
    ///
    /// Returns `None` if nothing was sent in time.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let (mut slot, _) = self
            .ready
            .wait_timeout_while(self.lock(), timeout, |slot| slot.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }

    /// Takes the pending value without blocking.
    pub fn try_receive(&self) -> Option<T> {
        self.lock().take()
    }

    /// Returns whether a value is waiting to be received.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// The slot holds either a whole value or nothing, so a poisoned lock is
    /// still consistent.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for HandoffChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HandoffChannel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffChannel")
            .field("pending", &self.has_pending())
            .finish()
    }
}
