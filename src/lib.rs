//! `trafficlight` - Randomized traffic signal with blocking observers
//!
//! A background timer flips the signal between stopped and go on a
//! randomized cadence and publishes every flip through a latest-wins
//! handoff channel. Observers either block until the signal turns go or
//! read the current phase without blocking.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod phase;
pub mod sync;
