//! Signal phase representation
//!
//! The two-valued phase plus the lock-free cell the timer loop writes and
//! `current_phase` reads.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Phase of the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Traffic must wait.
    #[default]
    Stopped,
    /// Traffic may proceed.
    Go,
}

impl Phase {
    /// Returns the opposite phase.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Stopped => Self::Go,
            Self::Go => Self::Stopped,
        }
    }

    /// Returns the lowercase name used in logs and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Go => "go",
        }
    }

    const fn from_bool(go: bool) -> Self {
        if go { Self::Go } else { Self::Stopped }
    }

    const fn is_go(self) -> bool {
        matches!(self, Self::Go)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomically updated [`Phase`].
///
/// Readers never block and never see a torn value. A reader racing the
/// timer loop may still observe the phase before or after the matching
/// handoff message becomes visible.
#[derive(Debug)]
pub struct AtomicPhase {
    go: AtomicBool,
}

impl AtomicPhase {
    /// Creates a cell holding `phase`.
    #[must_use]
    pub const fn new(phase: Phase) -> Self {
        Self {
            go: AtomicBool::new(phase.is_go()),
        }
    }

    /// Returns the stored phase.
    #[must_use]
    pub fn load(&self) -> Phase {
        Phase::from_bool(self.go.load(Ordering::SeqCst))
    }

    /// Flips the stored phase and returns the new value.
    pub fn toggle(&self) -> Phase {
        let was_go = self.go.fetch_xor(true, Ordering::SeqCst);
        Phase::from_bool(!was_go)
    }
}

impl Default for AtomicPhase {
    fn default() -> Self {
        Self::new(Phase::default())
    }
}
