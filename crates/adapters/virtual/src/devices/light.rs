//! Hue light — responds to `SWITCH_ON`, `SWITCH_OFF`, `CHANGE_COLOR`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use devhub_app::ports::Device;
use devhub_domain::error::DispatchError;
use devhub_domain::message::{CommandKind, Message};
use devhub_domain::reply::{DeviceReply, PowerState};

use super::lock;

const NAME: &str = "Hue Light";
const SUPPORTED: &[CommandKind] = &[
    CommandKind::SwitchOn,
    CommandKind::SwitchOff,
    CommandKind::ChangeColor,
];
const DEFAULT_COLOR: &str = "white";

struct LightState {
    power: PowerState,
    color: String,
}

/// A simulated colour light.
pub struct HueLight {
    latency: Duration,
    state: Mutex<LightState>,
}

impl Default for HueLight {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

impl HueLight {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

    /// A light that is off, white, and takes `latency` to react.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            state: Mutex::new(LightState {
                power: PowerState::Off,
                color: DEFAULT_COLOR.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn power(&self) -> PowerState {
        lock(&self.state).power
    }

    #[must_use]
    pub fn color(&self) -> String {
        lock(&self.state).color.clone()
    }
}

#[async_trait]
impl Device for HueLight {
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
                tracing::info!(device = NAME, "light switched on");
                DeviceReply::empty()
            }
            CommandKind::SwitchOff => {
                state.power = PowerState::Off;
                tracing::info!(device = NAME, "light switched off");
                DeviceReply::empty()
            }
            CommandKind::ChangeColor => {
                state.color = message.payload().unwrap_or(DEFAULT_COLOR).to_string();
                tracing::info!(device = NAME, color = %state.color, "light colour changed");
                DeviceReply::empty().with_detail(format!("colour set to {}", state.color))
            }
            other => return Err(self.unsupported(other)),
        };
        Ok(reply.with_power(state.power))
    }
}
