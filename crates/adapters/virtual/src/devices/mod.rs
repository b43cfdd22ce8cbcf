//! Virtual device implementations — light, speaker, toilet.
//!
//! Each device keeps its state behind a `std::sync::Mutex` so it can be
//! inspected through a shared `Arc` handle while the registry drives it.

mod light;
mod speaker;
mod toilet;

pub use light::HueLight;
pub use speaker::SmartSpeaker;
pub use toilet::SmartToilet;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
