//! Traffic light phase machine
//!
//! The signal alternates between [`Phase::Stopped`] and [`Phase::Go`] on a
//! randomized cadence driven by a background timer loop.
//!
//! # Architecture
//!
//! - [`Phase`] / [`AtomicPhase`] - Two-valued phase and its lock-free cell
//! - [`CycleSampler`] / [`PhaseTimer`] - Cycle length draws and the flip rule
//! - [`TrafficLight`] - Controller (timer loop, blocking and fast-path reads)

pub mod controller;
pub mod state;
pub mod timer;

pub use controller::TrafficLight;
pub use state::{AtomicPhase, Phase};
pub use timer::{CycleBounds, CycleSampler, PhaseTimer};
