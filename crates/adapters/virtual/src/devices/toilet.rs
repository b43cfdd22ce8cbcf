//! Smart toilet — responds to `FLUSH` and `CLEAN`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use devhub_app::ports::Device;
use devhub_domain::error::DispatchError;
use devhub_domain::message::{CommandKind, Message};
use devhub_domain::reply::DeviceReply;

use super::lock;

const NAME: &str = "Smart Toilet";
const SUPPORTED: &[CommandKind] = &[CommandKind::Flush, CommandKind::Clean];

#[derive(Default)]
struct Counters {
    flushes: u32,
    cleanings: u32,
}

/// A simulated toilet. Has no power state; it only counts what it did.
pub struct SmartToilet {
    latency: Duration,
    counters: Mutex<Counters>,
}

impl Default for SmartToilet {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

impl SmartToilet {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            counters: Mutex::new(Counters::default()),
        }
    }

    #[must_use]
    pub fn flushes(&self) -> u32 {
        lock(&self.counters).flushes
    }

    #[must_use]
    pub fn cleanings(&self) -> u32 {
        lock(&self.counters).cleanings
    }
}

#[async_trait]
impl Device for SmartToilet {
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

        let mut counters = lock(&self.counters);
        match message.kind() {
            CommandKind::Flush => {
                counters.flushes += 1;
                tracing::info!(device = NAME, "flushing");
                Ok(DeviceReply::empty().with_detail("flushed"))
            }
            CommandKind::Clean => {
                counters.cleanings += 1;
                tracing::info!(device = NAME, "cleaning");
                Ok(DeviceReply::empty().with_detail("cleaned"))
            }
            other => Err(self.unsupported(other)),
        }
    }
}
