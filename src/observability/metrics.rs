//! Metrics collection for `trafficlight`.
//!
//! Prometheus-compatible metrics recorded through the `metrics` facade.
//! Recording functions are no-ops until [`init_metrics`] installs a recorder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::TrafficLightError;
use crate::phase::Phase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// The HTTP listener is spawned on the current Tokio runtime, so call this
/// from within one when `port` is set.
///
/// # Errors
///
/// Returns `TrafficLightError::Metrics` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), TrafficLightError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| TrafficLightError::Metrics(e.to_string()))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "trafficlight_phase_transitions_total",
        "Total number of phase flips published"
    );
    describe_gauge!(
        "trafficlight_current_phase",
        "Current phase (1 = go, 0 = stopped)"
    );
    describe_histogram!(
        "trafficlight_cycle_duration_ms",
        "Drawn cycle duration in milliseconds"
    );
    describe_counter!(
        "trafficlight_green_waits_total",
        "Completed waits for green by outcome"
    );
}

/// Records a published phase flip and the cycle drawn for the next one.
pub fn record_phase_transition(to: Phase, next_cycle: Duration) {
    counter!("trafficlight_phase_transitions_total", "to" => to.as_str()).increment(1);
    gauge!("trafficlight_current_phase").set(match to {
        Phase::Go => 1.0,
        Phase::Stopped => 0.0,
    });
    histogram!("trafficlight_cycle_duration_ms").record(next_cycle.as_secs_f64() * 1000.0);
}

/// Records the end of a wait for green.
pub fn record_green_wait(received_go: bool) {
    let outcome = if received_go { "go" } else { "timeout" };
    counter!("trafficlight_green_waits_total", "outcome" => outcome).increment(1);
}
