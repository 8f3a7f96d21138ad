//! Configuration schema
//!
//! ```yaml
//! cycle:
//!   min: 4s
//!   max: 6s
//! poll_interval: 1ms
//! seed: 42
//! ```
//!
//! Every field is optional; omitted fields take the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::phase::timer::{CycleBounds, DEFAULT_MAX_CYCLE, DEFAULT_MIN_CYCLE};

/// Default idle yield for the timer loop and waiters.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Traffic light configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    /// Range cycle lengths are drawn from.
    pub cycle: CycleConfig,

    /// Idle yield between timer loop iterations and before each blocking
    /// receive in a waiter.
    #[serde(with = "duration_str")]
    pub poll_interval: Duration,

    /// Seed for cycle draws. `None` seeds from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            cycle: CycleConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            seed: None,
        }
    }
}

impl LightConfig {
    /// Returns the cycle range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless `0 < cycle.min < cycle.max`.
    pub fn cycle_bounds(&self) -> Result<CycleBounds, ConfigError> {
        CycleBounds::new(self.cycle.min, self.cycle.max).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "cycle".to_string(),
                value: format!(
                    "[{}, {})",
                    humantime::format_duration(self.cycle.min),
                    humantime::format_duration(self.cycle.max)
                ),
                expected: "a non-zero min strictly below max".to_string(),
            }
        })
    }
}

/// Cycle length range, `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CycleConfig {
    /// Shortest cycle (inclusive).
    #[serde(with = "duration_str")]
    pub min: Duration,

    /// Longest cycle (exclusive).
    #[serde(with = "duration_str")]
    pub max: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_CYCLE,
            max: DEFAULT_MAX_CYCLE,
        }
    }
}

/// Durations as humantime strings (`"4s"`, `"1500ms"`, `"1m 30s"`).
mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
