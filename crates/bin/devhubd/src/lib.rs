//! # devhubd — devhub demonstration daemon
//!
//! Composition root that wires the virtual devices into a [`HubService`]
//! and runs the fixed household scenario.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Construct the virtual devices with their configured latencies
//! - Register them concurrently with the hub
//! - Run the wake-up and sleep programs back to back
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no dispatch logic belongs here.
//!
//! [`HubService`]: devhub_app::services::hub_service::HubService

pub mod config;
pub mod scenario;
