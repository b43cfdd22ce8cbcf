//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the dispatch core and the outside world.
//! They are defined here (in `app`) so that both the engine and the device
//! adapters can depend on them without creating circular dependencies.

pub mod device;

pub use device::Device;
