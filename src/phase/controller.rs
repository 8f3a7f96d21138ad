//! Traffic light controller
//!
//! `TrafficLight` owns the phase cell and the handoff channel. Its timer
//! loop, started by [`TrafficLight::simulate`], is the only producer on the
//! channel; callers of [`TrafficLight::wait_for_green`] consume from it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{DEFAULT_POLL_INTERVAL, LightConfig};
use crate::error::{ConfigError, LightError};
use crate::observability::metrics;
use crate::sync::{HandoffChannel, ShutdownSignal, ThreadRegistry};

use super::state::{AtomicPhase, Phase};
use super::timer::{CycleBounds, CycleSampler, PhaseTimer};

/// Name given to timer loop threads.
pub const TIMER_THREAD_NAME: &str = "traffic-light-timer";

/// A single traffic signal toggling between stopped and go.
///
/// Starts in [`Phase::Stopped`]. Each timer loop flips the phase once its
/// randomized cycle has run out and publishes the new phase on the handoff
/// channel. Flips strictly alternate.
pub struct TrafficLight {
    /// Fast-path phase, read without touching the channel
    phase: AtomicPhase,
    /// Every published flip, latest wins
    channel: HandoffChannel<Phase>,
    /// Cycle length source shared by all timer loops of this light
    sampler: Mutex<CycleSampler>,
    /// Idle yield between loop iterations and before each blocking receive
    poll_interval: Duration,
    /// Stops timer loops once triggered
    shutdown: ShutdownSignal,
    /// Number of flips published
    transitions: AtomicU64,
    /// Held across toggle and send so concurrent loops publish in flip order
    publish: Mutex<()>,
}

impl TrafficLight {
    /// Creates a stopped light configured by `config`.
    ///
    /// Cycles are drawn from a sampler seeded with `config.seed`, or from OS
    /// entropy when no seed is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the cycle range is empty.
    pub fn new(config: &LightConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_sampler(
            CycleSampler::new(config.cycle_bounds()?, config.seed),
            config.poll_interval,
        ))
    }

    /// Creates a stopped light drawing cycles from `sampler`.
    #[must_use]
    pub fn with_sampler(sampler: CycleSampler, poll_interval: Duration) -> Self {
        Self {
            phase: AtomicPhase::new(Phase::Stopped),
            channel: HandoffChannel::new(),
            sampler: Mutex::new(sampler),
            poll_interval,
            shutdown: ShutdownSignal::new(),
            transitions: AtomicU64::new(0),
            publish: Mutex::new(()),
        }
    }

    /// Returns the current phase without blocking.
    ///
    /// Not synchronized with the handoff channel: the value may be ahead of
    /// or behind the last phase a waiter received.
    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.phase.load()
    }

    /// Returns the number of flips published so far.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transitions.load(Ordering::SeqCst)
    }

    /// Returns the idle yield used by the timer loop and by waiters.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Starts a timer loop on a new thread and registers it with `registry`.
    ///
    /// Returns as soon as the thread is spawned. The loop runs until
    /// [`shutdown`](Self::shutdown) is called. Each call starts another loop.
    ///
    /// # Errors
    ///
    /// Returns [`LightError::Spawn`] if the OS refuses to create the thread.
    pub fn simulate(self: &Arc<Self>, registry: &ThreadRegistry) -> Result<(), LightError> {
        let light = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_owned())
            .spawn(move || light.cycle_through_phases())
            .map_err(LightError::Spawn)?;

        registry.register(handle);
        Ok(())
    }

    /// Blocks until a [`Phase::Go`] is received from the handoff channel.
    ///
    /// Values of [`Phase::Stopped`] are discarded and the wait continues.
    /// The fast-path phase is never consulted.
    pub fn wait_for_green(&self) {
        loop {
            thread::sleep(self.poll_interval);
            if self.channel.receive() == Phase::Go {
                metrics::record_green_wait(true);
                return;
            }
        }
    }

    /// Like [`wait_for_green`](Self::wait_for_green), but gives up after
    /// `timeout`.
    ///
    /// Returns `true` if go was received in time.
    pub fn wait_for_green_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            thread::sleep(self.poll_interval);
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.channel.receive_timeout(remaining) {
                Some(Phase::Go) => {
                    metrics::record_green_wait(true);
                    return true;
                }
                Some(Phase::Stopped) => {}
                None => {
                    metrics::record_green_wait(false);
                    return false;
                }
            }
        }
    }

    /// Asks every timer loop of this light to exit.
    ///
    /// Loops notice within one iteration, including loops sleeping toward
    /// their cycle deadline. Blocked waiters are not woken.
    pub fn shutdown(&self) {
        debug!("traffic light shutdown requested");
        self.shutdown.trigger();
    }

    /// Returns whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Handoff channel the timer loop publishes on.
    #[must_use]
    pub const fn channel(&self) -> &HandoffChannel<Phase> {
        &self.channel
    }

    /// Timer loop body.
    fn cycle_through_phases(&self) {
        let mut timer = PhaseTimer::new(Instant::now(), self.next_cycle());
        debug!(first_cycle_ms = timer.cycle().as_millis(), "timer loop started");

        loop {
            let wait = timer.remaining(Instant::now()).max(self.poll_interval);
            if self.shutdown.sleep_unless_triggered(wait) {
                break;
            }

            if timer.poll(Instant::now(), || self.next_cycle()) {
                self.publish_flip(timer.cycle());
            }
        }

        debug!(transitions = self.transition_count(), "timer loop stopped");
    }

    /// Flips the phase, then hands the new phase to waiters.
    fn publish_flip(&self, next_cycle: Duration) {
        let phase = {
            let _publishing = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
            let phase = self.phase.toggle();
            self.transitions.fetch_add(1, Ordering::SeqCst);
            self.channel.send(phase);
            phase
        };

        info!(
            %phase,
            next_cycle_ms = next_cycle.as_millis(),
            "traffic light phase changed"
        );
        metrics::record_phase_transition(phase, next_cycle);
    }

    fn next_cycle(&self) -> Duration {
        self.sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_cycle()
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self::with_sampler(
            CycleSampler::from_entropy(CycleBounds::default()),
            DEFAULT_POLL_INTERVAL,
        )
    }
}

impl std::fmt::Debug for TrafficLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrafficLight")
            .field("current_phase", &self.current_phase())
            .field("transitions", &self.transition_count())
            .field("is_shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fast_light(seed: u64) -> Arc<TrafficLight> {
        let bounds = CycleBounds::new(ms(20), ms(30)).unwrap();
        Arc::new(TrafficLight::with_sampler(
            CycleSampler::seeded(bounds, seed),
            ms(1),
        ))
    }

    /// Light whose timer never fires during a test.
    fn idle_light() -> Arc<TrafficLight> {
        Arc::new(TrafficLight::with_sampler(
            CycleSampler::seeded(CycleBounds::default(), 0),
            ms(1),
        ))
    }

    #[test]
    fn test_new_light_is_stopped() {
        let light = TrafficLight::default();
        assert_eq!(light.current_phase(), Phase::Stopped);
        assert_eq!(light.transition_count(), 0);
        assert!(!light.is_shut_down());
        assert!(!light.channel().has_pending());
    }

    #[test]
    fn test_simulate_registers_and_starts_stopped() {
        let light = Arc::new(TrafficLight::default());
        let registry = ThreadRegistry::new();

        light.simulate(&registry).unwrap();
        assert_eq!(registry.len(), 1);
        // Minimum cycle is 4s; nothing can have flipped yet
        assert_eq!(light.current_phase(), Phase::Stopped);

        light.shutdown();
        assert_eq!(registry.join_all(), 1);
        assert_eq!(light.transition_count(), 0);
    }

    #[test]
    fn test_flips_alternate_starting_with_go() {
        let light = fast_light(1);
        let registry = ThreadRegistry::new();
        light.simulate(&registry).unwrap();

        // The first published phase is always go
        light.wait_for_green();
        assert!(light.transition_count() >= 1);

        light.shutdown();
        registry.join_all();

        let flips = light.transition_count();
        let expected = if flips % 2 == 1 { Phase::Go } else { Phase::Stopped };
        assert_eq!(light.current_phase(), expected);
    }

    #[test]
    fn test_wait_for_green_ignores_stopped() {
        let light = idle_light();
        let (done_tx, done_rx) = mpsc::channel();

        let waiter = {
            let light = Arc::clone(&light);
            thread::spawn(move || {
                light.wait_for_green();
                done_tx.send(()).unwrap();
            })
        };

        for _ in 0..5 {
            light.channel().send(Phase::Stopped);
            thread::sleep(ms(10));
        }
        assert!(done_rx.recv_timeout(ms(50)).is_err(), "returned on stopped");

        light.channel().send(Phase::Go);
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
        assert!(!light.channel().has_pending());
    }

    #[test]
    fn test_wait_for_green_returns_immediately_on_pending_go() {
        let light = idle_light();
        light.channel().send(Phase::Go);
        light.wait_for_green();
        assert!(!light.channel().has_pending());
    }

    #[test]
    fn test_wait_for_green_sees_only_latest() {
        let light = idle_light();
        // go superseded by stopped before anyone received
        light.channel().send(Phase::Go);
        light.channel().send(Phase::Stopped);
        assert!(!light.wait_for_green_timeout(ms(30)));
    }

    #[test]
    fn test_wait_for_green_timeout_expires() {
        let light = idle_light();
        let start = Instant::now();
        assert!(!light.wait_for_green_timeout(ms(20)));
        assert!(start.elapsed() >= ms(20));
    }

    #[test]
    fn test_wait_for_green_timeout_success() {
        let light = fast_light(9);
        let registry = ThreadRegistry::new();
        light.simulate(&registry).unwrap();

        assert!(light.wait_for_green_timeout(Duration::from_secs(5)));

        light.shutdown();
        registry.join_all();
    }

    #[test]
    fn test_shutdown_stops_sleeping_loop_promptly() {
        let light = idle_light();
        let registry = ThreadRegistry::new();
        light.simulate(&registry).unwrap();

        thread::sleep(ms(10));
        let start = Instant::now();
        light.shutdown();
        registry.join_all();

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(light.is_shut_down());
    }

    #[test]
    fn test_concurrent_loops_leave_latest_phase_in_slot() {
        let bounds = CycleBounds::new(Duration::from_nanos(1), Duration::from_nanos(2)).unwrap();
        let mut mismatches = 0;

        for round in 0..200 {
            let light = Arc::new(TrafficLight::with_sampler(
                CycleSampler::seeded(bounds, round),
                Duration::from_nanos(1),
            ));
            let registry = ThreadRegistry::new();
            for _ in 0..4 {
                light.simulate(&registry).unwrap();
            }

            thread::sleep(ms(5));
            light.shutdown();
            assert_eq!(registry.join_all(), 4);

            let flips = light.transition_count();
            let expected = if flips % 2 == 1 { Phase::Go } else { Phase::Stopped };
            assert_eq!(light.current_phase(), expected);

            let current = light.current_phase();
            if light.channel().try_receive().is_some_and(|last| last != current) {
                mismatches += 1;
            }
        }

        assert_eq!(mismatches, 0, "last delivered phase disagreed with current phase");
    }

    #[test]
    fn test_new_from_config() {
        let config = LightConfig {
            seed: Some(4),
            ..LightConfig::default()
        };
        let light = TrafficLight::new(&config).unwrap();
        assert_eq!(light.current_phase(), Phase::Stopped);
        assert_eq!(light.poll_interval(), DEFAULT_POLL_INTERVAL);
    }

    #[test]
    fn test_new_rejects_empty_cycle_range() {
        let mut config = LightConfig::default();
        config.cycle.max = config.cycle.min;
        assert!(TrafficLight::new(&config).is_err());
    }

    #[test]
    fn test_debug_output() {
        let light = TrafficLight::default();
        let debug = format!("{light:?}");
        assert!(debug.contains("TrafficLight"));
        assert!(debug.contains("current_phase: Stopped"));
    }
}
