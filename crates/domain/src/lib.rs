//! # devhub-domain
//!
//! Pure domain model for the devhub command-dispatch harness.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Messages** (one command addressed to one device)
//! - Define **Programs** (an ordered batch of messages plus an execution discipline)
//! - Define **Replies** (what a device hands back after handling a message)
//! - Define **Reports** (per-message deliveries and failures of a dispatch)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or IO crates.
//! The device capability contract is expressed as a trait in the `app` crate (port).

pub mod error;
pub mod id;
pub mod time;

pub mod message;
pub mod program;
pub mod reply;
pub mod report;
