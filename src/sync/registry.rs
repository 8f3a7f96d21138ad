//! Registry of background threads.
//!
//! Components that spawn long-running threads append the handles here so the
//! owner of the registry decides when (and whether) to join them.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, warn};

/// Shared, append-only collection of thread handles.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threads: Mutex::new(Vec::new()),
        }
    }

    /// Appends a spawned thread.
    pub fn register(&self, handle: JoinHandle<()>) {
        self.lock().push(handle);
    }

    /// Returns the number of threads registered and not yet joined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no threads are waiting to be joined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Joins every registered thread, blocking until all have exited.
    ///
    /// Threads that panicked are logged and counted as joined. Returns the
    /// number of threads joined.
    pub fn join_all(&self) -> usize {
        let handles = std::mem::take(&mut *self.lock());
        let count = handles.len();

        for handle in handles {
            let name = handle.thread().name().unwrap_or("<unnamed>").to_owned();
            if handle.join().is_err() {
                warn!(thread = %name, "registered thread panicked");
            } else {
                debug!(thread = %name, "registered thread joined");
            }
        }

        count
    }

    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
