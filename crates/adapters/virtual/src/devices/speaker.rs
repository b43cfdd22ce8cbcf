//! Smart speaker — responds to `SWITCH_ON`, `SWITCH_OFF`, `PLAY_SONG`.
//!
//! A song only plays while the speaker is on. `PLAY_SONG` on a speaker that is
//! off succeeds but leaves nothing playing; the reply reports the power state
//! so callers can see it. `PLAY_SONG` without a title plays nothing either.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use devhub_app::ports::Device;
use devhub_domain::error::DispatchError;
use devhub_domain::message::{CommandKind, Message};
use devhub_domain::reply::{DeviceReply, PowerState};

use super::lock;

const NAME: &str = "Smart Speaker";
const NO_SONG: &str = "no song given";
const SUPPORTED: &[CommandKind] = &[
    CommandKind::SwitchOn,
    CommandKind::SwitchOff,
    CommandKind::PlaySong,
];

struct SpeakerState {
    power: PowerState,
    now_playing: Option<String>,
}

/// A simulated speaker that plays songs once powered on.
pub struct SmartSpeaker {
    latency: Duration,
    state: Mutex<SpeakerState>,
}

impl Default for SmartSpeaker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

impl SmartSpeaker {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            state: Mutex::new(SpeakerState {
                power: PowerState::Off,
                now_playing: None,
            }),
        }
    }

    #[must_use]
    pub fn power(&self) -> PowerState {
        lock(&self.state).power
    }

    /// Title of the song currently playing, if any.
    #[must_use]
    pub fn now_playing(&self) -> Option<String> {
        lock(&self.state).now_playing.clone()
    }
}

#[async_trait]
impl Device for SmartSpeaker {
    fn name(&self) -> &str {
        NAME
    }

    fn supported_commands(&self) -> &'static [CommandKind] {
        SUPPORTED
    }

    async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError> {
        if !self.supports(message.kind()) {
            return Err(self.unsupported(message.kind()));
        }
        tokio::time::sleep(self.latency).await;

        let mut state = lock(&self.state);
        let reply = match message.kind() {
            CommandKind::SwitchOn => {
                state.power = PowerState::On;
                tracing::info!(device = NAME, "speaker switched on");
                DeviceReply::empty()
            }
            CommandKind::SwitchOff => {
                state.power = PowerState::Off;
                state.now_playing = None;
                tracing::info!(device = NAME, "speaker switched off");
                DeviceReply::empty()
            }
            CommandKind::PlaySong => match message.payload().map(str::trim) {
                None | Some("") => {
                    tracing::warn!(device = NAME, "no song given, nothing played");
                    DeviceReply::empty().with_detail(NO_SONG)
                }
                Some(title) if state.power.is_on() => {
                    tracing::info!(device = NAME, song = %title, "playing song");
                    state.now_playing = Some(title.to_string());
                    DeviceReply::empty().with_detail(format!("playing {title}"))
                }
                Some(title) => {
                    tracing::warn!(device = NAME, song = %title, "speaker is off, song not played");
                    DeviceReply::empty().with_detail("speaker is off")
                }
            },
            other => return Err(self.unsupported(other)),
        };
        Ok(reply.with_power(state.power))
    }
}
