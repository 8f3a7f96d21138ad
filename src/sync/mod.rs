//! Thread synchronization primitives
//!
//! - [`HandoffChannel`] - Latest-wins single-slot relay with blocking receive
//! - [`ShutdownSignal`] - Latching stop flag background loops sleep on
//! - [`ThreadRegistry`] - Append-only record of spawned threads for the owner to join

pub mod handoff;
pub mod registry;
pub mod shutdown;

pub use handoff::HandoffChannel;
pub use registry::ThreadRegistry;
pub use shutdown::ShutdownSignal;
