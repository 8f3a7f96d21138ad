//! Configuration module
//!
//! Loading and validation of traffic light configuration files.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::MAX_CONFIG_SIZE;
pub use schema::{CycleConfig, DEFAULT_POLL_INTERVAL, LightConfig};
pub use validation::MAX_CYCLE_LIMIT;
