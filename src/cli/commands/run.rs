//! `run` command handler
//!
//! Starts one traffic light, one vehicle thread that repeatedly waits for
//! green, and a reporter that logs the fast-path phase. Runs until the
//! process is signalled or `--duration` elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::args::RunArgs;
use crate::config::LightConfig;
use crate::error::{ConfigError, TrafficLightError};
use crate::observability::init_metrics;
use crate::phase::TrafficLight;
use crate::sync::ThreadRegistry;

/// Longest single wait of the vehicle before it re-checks cancellation.
const VEHICLE_WAIT_SLICE: Duration = Duration::from_millis(250);

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Phase flips published by the light.
    pub transitions: u64,
    /// Times the vehicle received go.
    pub crossings: u64,
    /// Timer threads joined at shutdown.
    pub joined_threads: usize,
}

/// Run a traffic light until cancelled or `--duration` elapses.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the metrics endpoint
/// cannot be installed, or the timer thread cannot be spawned.
pub async fn run(
    args: &RunArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), TrafficLightError> {
    let config = resolve_config(args)?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let summary = drive_light(&config, args.report_interval, args.duration, cancel).await?;

    if !quiet {
        println!(
            "transitions: {}, crossings: {}, timer threads joined: {}",
            summary.transitions, summary.crossings, summary.joined_threads
        );
    }
    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides.
///
/// # Errors
///
/// Returns a configuration error if loading fails or the merged
/// configuration is invalid.
pub fn resolve_config(args: &RunArgs) -> Result<LightConfig, TrafficLightError> {
    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "loading configuration");
            LightConfig::load(path)?
        }
        None => LightConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(min) = args.min_cycle {
        config.cycle.min = min;
    }
    if let Some(max) = args.max_cycle {
        config.cycle.max = max;
    }
    if let Some(poll) = args.poll_interval {
        config.poll_interval = poll;
    }

    config.validate()?;
    Ok(config)
}

/// Runs one light with one vehicle and a phase reporter.
///
/// Stops when `cancel` fires or `limit` elapses, then shuts the light down
/// and joins its timer thread.
///
/// # Errors
///
/// Returns a configuration error if `report_interval` is zero, or an error
/// if the light cannot be built or started or a background task panics.
pub async fn drive_light(
    config: &LightConfig,
    report_interval: Duration,
    limit: Option<Duration>,
    cancel: CancellationToken,
) -> Result<RunSummary, TrafficLightError> {
    if report_interval.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: "report_interval".to_string(),
            value: humantime::format_duration(report_interval).to_string(),
            expected: "a non-zero duration".to_string(),
        }
        .into());
    }

    let light = Arc::new(TrafficLight::new(config)?);
    let registry = Arc::new(ThreadRegistry::new());
    light.simulate(&registry)?;
    info!(
        min_cycle_ms = config.cycle.min.as_millis(),
        max_cycle_ms = config.cycle.max.as_millis(),
        "traffic light started"
    );

    let stop = cancel.child_token();

    let vehicle = tokio::task::spawn_blocking({
        let light = Arc::clone(&light);
        let stop = stop.clone();
        move || cross_on_green(&light, &stop)
    });

    let reporter = tokio::spawn(report_phases(
        Arc::clone(&light),
        report_interval,
        stop.clone(),
    ));

    match limit {
        Some(limit) => {
            tokio::select! {
                () = stop.cancelled() => debug!("run cancelled"),
                () = tokio::time::sleep(limit) => debug!(?limit, "run duration elapsed"),
            }
        }
        None => stop.cancelled().await,
    }

    stop.cancel();
    light.shutdown();

    let crossings = vehicle.await?;
    reporter.await?;

    let joined_threads = tokio::task::spawn_blocking(move || registry.join_all()).await?;

    let summary = RunSummary {
        transitions: light.transition_count(),
        crossings,
        joined_threads,
    };
    info!(
        transitions = summary.transitions,
        crossings = summary.crossings,
        "traffic light stopped"
    );
    Ok(summary)
}

/// Vehicle loop: wait for green, cross, repeat until `stop` fires.
fn cross_on_green(light: &TrafficLight, stop: &CancellationToken) -> u64 {
    let mut crossings = 0;
    while !stop.is_cancelled() {
        if light.wait_for_green_timeout(VEHICLE_WAIT_SLICE) {
            crossings += 1;
            info!(crossings, "vehicle crossed on green");
        }
    }
    crossings
}

async fn report_phases(light: Arc<TrafficLight>, every: Duration, stop: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            () = stop.cancelled() => break,
            _ = interval.tick() => {
                info!(
                    phase = %light.current_phase(),
                    transitions = light.transition_count(),
                    "traffic light status"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["trafficlight", "run"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            Commands::Validate(_) => panic!("Expected RunArgs"),
        }
    }

    fn fast_config() -> LightConfig {
        let mut config = LightConfig {
            seed: Some(17),
            ..LightConfig::default()
        };
        config.cycle.min = Duration::from_millis(20);
        config.cycle.max = Duration::from_millis(30);
        config
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(&run_args(&[])).unwrap();
        assert_eq!(config, LightConfig::default());
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let config = resolve_config(&run_args(&[
            "--min-cycle",
            "100ms",
            "--max-cycle",
            "200ms",
            "--poll-interval",
            "2ms",
            "--seed",
            "3",
        ]))
        .unwrap();
        assert_eq!(config.cycle.min, Duration::from_millis(100));
        assert_eq!(config.cycle.max, Duration::from_millis(200));
        assert_eq!(config.poll_interval, Duration::from_millis(2));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_resolve_rejects_invalid_overrides() {
        let err = resolve_config(&run_args(&["--min-cycle", "10s"])).unwrap_err();
        assert!(matches!(err, TrafficLightError::Config(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drive_light_until_duration() {
        let summary = drive_light(
            &fast_config(),
            Duration::from_millis(50),
            Some(Duration::from_millis(400)),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.joined_threads, 1);
        assert!(summary.transitions >= 2, "{summary:?}");
        assert!(summary.crossings >= 1, "{summary:?}");
        assert!(summary.crossings <= summary.transitions);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drive_light_rejects_zero_report_interval() {
        let err = drive_light(
            &LightConfig::default(),
            Duration::ZERO,
            Some(Duration::from_millis(50)),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(
            matches!(
                &err,
                TrafficLightError::Config(ConfigError::InvalidValue { field, .. })
                    if field == "report_interval"
            ),
            "unexpected error: {err:?}"
        );
        assert_eq!(err.exit_code(), crate::error::ExitCode::CONFIG_ERROR);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drive_light_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let summary = drive_light(
            &LightConfig::default(),
            Duration::from_secs(1),
            None,
            cancel,
        )
        .await
        .unwrap();

        // Default cycles are at least 4s, so nothing flipped
        assert_eq!(summary.transitions, 0);
        assert_eq!(summary.crossings, 0);
        assert_eq!(summary.joined_threads, 1);
    }
}
