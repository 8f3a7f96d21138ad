//! Cycle timing for the phase loop
//!
//! [`CycleSampler`] draws each cycle length uniformly from a half-open
//! range, and [`PhaseTimer`] decides when the current cycle has run out.
//! Both are free of threads and real clocks so the flip rule can be tested
//! with a seeded RNG and synthetic instants.

use std::ops::Range;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default shortest cycle (inclusive).
pub const DEFAULT_MIN_CYCLE: Duration = Duration::from_millis(4000);

/// Default longest cycle (exclusive).
pub const DEFAULT_MAX_CYCLE: Duration = Duration::from_millis(6000);

/// Half-open range `[min, max)` of cycle durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    min: Duration,
    max: Duration,
}

impl CycleBounds {
    /// Creates bounds, or `None` unless `0 < min < max`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Option<Self> {
        (!min.is_zero() && min < max).then_some(Self { min, max })
    }

    /// Shortest cycle (inclusive).
    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    /// Longest cycle (exclusive).
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Returns whether `cycle` lies in `[min, max)`.
    #[must_use]
    pub fn contains(&self, cycle: Duration) -> bool {
        self.min <= cycle && cycle < self.max
    }

    fn as_nanos(&self) -> Range<u64> {
        to_nanos(self.min)..to_nanos(self.max)
    }
}

impl Default for CycleBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_CYCLE,
            max: DEFAULT_MAX_CYCLE,
        }
    }
}

fn to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Source of independent, uniformly distributed cycle durations.
///
/// Draws at nanosecond resolution, so every sample lies in `[min, max)`.
#[derive(Debug, Clone)]
pub struct CycleSampler {
    bounds: CycleBounds,
    rng: StdRng,
}

impl CycleSampler {
    /// Creates a sampler seeded from OS entropy.
    #[must_use]
    pub fn from_entropy(bounds: CycleBounds) -> Self {
        Self {
            bounds,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a deterministic sampler; the same seed yields the same
    /// sequence of cycles.
    #[must_use]
    pub fn seeded(bounds: CycleBounds, seed: u64) -> Self {
        Self {
            bounds,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a sampler seeded with `seed` when given, from entropy otherwise.
    #[must_use]
    pub fn new(bounds: CycleBounds, seed: Option<u64>) -> Self {
        seed.map_or_else(
            || Self::from_entropy(bounds),
            |seed| Self::seeded(bounds, seed),
        )
    }

    /// Draws the next cycle duration.
    pub fn next_cycle(&mut self) -> Duration {
        Duration::from_nanos(self.rng.random_range(self.bounds.as_nanos()))
    }
}

/// Tracks the running cycle of a phase loop.
///
/// The cycle is due once the time elapsed since the last flip strictly
/// exceeds the current cycle length.
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    last_flip: Instant,
    cycle: Duration,
}

impl PhaseTimer {
    /// Starts timing a first cycle of length `cycle` at `start`.
    #[must_use]
    pub const fn new(start: Instant, cycle: Duration) -> Self {
        Self {
            last_flip: start,
            cycle,
        }
    }

    /// Length of the running cycle.
    #[must_use]
    pub const fn cycle(&self) -> Duration {
        self.cycle
    }

    /// Instant at which the running cycle runs out.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.last_flip + self.cycle
    }

    /// Time left until [`deadline`](Self::deadline), zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline().saturating_duration_since(now)
    }

    /// Checks the running cycle at `now`.
    ///
    /// When it is due, restarts timing from `now` with a length drawn from
    /// `next_cycle` and returns `true`. Otherwise leaves the timer untouched.
    pub fn poll(&mut self, now: Instant, next_cycle: impl FnOnce() -> Duration) -> bool {
        if now.saturating_duration_since(self.last_flip) <= self.cycle {
            return false;
        }
        self.last_flip = now;
        self.cycle = next_cycle();
        true
    }
}
