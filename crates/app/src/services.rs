//! Application services — use-case implementations.
//!
//! Services hold the registry behind an `Arc` so they stay cheap to clone and
//! can be driven from several tasks at once.

pub mod hub_service;
pub mod program_runner;
