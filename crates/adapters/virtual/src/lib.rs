//! # devhub-adapter-virtual
//!
//! Simulated devices for testing and demonstration purposes.
//!
//! ## Provided devices
//!
//! | Device | Accepts | Default latency |
//! |--------|---------|-----------------|
//! | [`HueLight`] | `SWITCH_ON` / `SWITCH_OFF` / `CHANGE_COLOR(colour)` | 500 ms |
//! | [`SmartSpeaker`] | `SWITCH_ON` / `SWITCH_OFF` / `PLAY_SONG(title)` | 1000 ms |
//! | [`SmartToilet`] | `FLUSH` / `CLEAN` | 1500 ms |
//!
//! Every device sleeps for its latency before applying the effect, and
//! rejects anything else with `UnsupportedCommand`.
//!
//! ## Dependency rule
//!
//! Depends on `devhub-app` (port traits) and `devhub-domain` only.

mod devices;

pub use devices::{HueLight, SmartSpeaker, SmartToilet};
