//! # devhub-app
//!
//! Application layer — the registry + dispatch engine and the **device port**.
//!
//! ## Responsibilities
//! - Define the **port trait** every device variant implements:
//!   - `Device` — handle a single message, return a reply
//! - Provide the **registry** that assigns identifiers and owns devices
//! - Provide the **dispatcher** with its two execution disciplines:
//!   - parallel batch (fail-together)
//!   - in-order sequence (fail-fast)
//! - Define **driving/inbound** use-cases:
//!   - `ProgramRunner` — run a program with its declared discipline
//!   - `HubService` — register devices and run programs
//!
//! ## Dependency rule
//! Depends on `devhub-domain` only (plus `tokio` for tasks, locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod ports;
pub mod registry;
pub mod services;
