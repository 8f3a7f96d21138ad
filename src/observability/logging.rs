//! Logging initialization for `trafficlight`.
//!
//! `-v` flags raise the level of this crate only. Dependencies stay at
//! `warn` so tokio and the metrics exporter do not drown out phase changes.
//! `TRAFFICLIGHT_LOG_LEVEL` replaces the whole filter when it parses.
//! Every line carries the emitting thread's name, which separates the
//! timer loop from the vehicle and the reporter.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding a full filter that overrides `-v`.
pub const LOG_LEVEL_ENV: &str = "TRAFFICLIGHT_LOG_LEVEL";

/// Filter target for this crate's own events.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Level applied to every other crate.
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::WARN;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Level for this crate at a given `-v` count. Saturates at trace.
#[must_use]
pub const fn crate_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Filter directives used when no override is set.
///
/// `warn` at zero verbosity, otherwise `warn,trafficlight=<level>`.
#[must_use]
pub fn default_directives(verbosity: u8) -> String {
    let level = crate_level(verbosity);
    if level == DEPENDENCY_LEVEL {
        DEPENDENCY_LEVEL.to_string()
    } else {
        format!("{DEPENDENCY_LEVEL},{CRATE_TARGET}={level}")
    }
}

/// Builds the subscriber filter.
///
/// `override_directives` (the value of [`LOG_LEVEL_ENV`]) wins when it
/// parses. An unparseable override is reported on stderr and ignored.
#[must_use]
pub fn build_filter(override_directives: Option<&str>, verbosity: u8) -> EnvFilter {
    if let Some(directives) = override_directives {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("ignoring {LOG_LEVEL_ENV}={directives:?}: {e}"),
        }
    }
    EnvFilter::new(default_directives(verbosity))
}

/// Initializes the global tracing subscriber.
///
/// Uses `try_init()`, so later calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let override_directives = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(override_directives.as_deref(), verbosity);

    let show_target = verbosity >= 2;

    let use_ansi = match color {
        ColorChoice::Auto => {
            std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(show_target)
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder.with_ansi(use_ansi).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
