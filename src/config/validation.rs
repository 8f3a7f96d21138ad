//! Configuration validation
//!
//! Rejects values the timer loop cannot run with. Deserialization already
//! enforces types and unknown fields; this covers the semantic limits.

use std::time::Duration;

use crate::error::ConfigError;

use super::schema::LightConfig;

/// Longest accepted cycle.
pub const MAX_CYCLE_LIMIT: Duration = Duration::from_secs(3600);

/// Checks `config` for values the signal cannot run with.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for the first offending field.
pub fn validate(config: &LightConfig) -> Result<(), ConfigError> {
    let bounds = config.cycle_bounds()?;

    if bounds.max() > MAX_CYCLE_LIMIT {
        return Err(invalid(
            "cycle.max",
            bounds.max(),
            format!("at most {}", humantime::format_duration(MAX_CYCLE_LIMIT)),
        ));
    }

    if config.poll_interval.is_zero() {
        return Err(invalid(
            "poll_interval",
            config.poll_interval,
            "a non-zero duration".to_string(),
        ));
    }

    if config.poll_interval >= bounds.min() {
        return Err(invalid(
            "poll_interval",
            config.poll_interval,
            format!(
                "shorter than cycle.min ({})",
                humantime::format_duration(bounds.min())
            ),
        ));
    }

    Ok(())
}

fn invalid(field: &str, value: Duration, expected: String) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: humantime::format_duration(value).to_string(),
        expected,
    }
}
