//! Device port — the capability every virtual device implements.
//!
//! A device handles one [`Message`] at a time and hands back a
//! [`DeviceReply`]. Concrete variants (light, speaker, …) live in adapter
//! crates and differ only in which [`CommandKind`]s they accept and what
//! effect or latency each one produces.

use std::sync::Arc;

use async_trait::async_trait;

use devhub_domain::error::{DispatchError, UnsupportedCommandError};
use devhub_domain::message::{CommandKind, Message};
use devhub_domain::reply::DeviceReply;

/// A device the registry can own and the dispatcher can drive.
///
/// Object safe so the registry can store heterogeneous variants behind
/// `Box<dyn Device>`.
#[async_trait]
pub trait Device: Send + Sync {
    /// Human-readable name used in logs and errors (e.g. `"Hue Light"`).
    fn name(&self) -> &str;

    /// The command kinds this device claims to support.
    fn supported_commands(&self) -> &'static [CommandKind];

    /// Whether `kind` belongs to [`supported_commands`](Self::supported_commands).
    fn supports(&self, kind: CommandKind) -> bool {
        self.supported_commands().contains(&kind)
    }

    /// Build the error returned for a kind outside the declared set.
    fn unsupported(&self, kind: CommandKind) -> DispatchError {
        UnsupportedCommandError {
            device: self.name().to_string(),
            kind,
        }
        .into()
    }

    /// Perform the effect described by `message`.
    ///
    /// May suspend to simulate hardware latency. This is the only suspension
    /// point of a dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedCommand`] when `message.kind()` is
    /// not one this device implements.
    async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError>;
}

#[async_trait]
impl<T: Device + ?Sized> Device for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supported_commands(&self) -> &'static [CommandKind] {
        (**self).supported_commands()
    }

    async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError> {
        (**self).handle(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devhub_domain::id::DeviceId;
    use devhub_domain::reply::PowerState;

    struct Doorbell;

    #[async_trait]
    impl Device for Doorbell {
        fn name(&self) -> &str {
            "Doorbell"
        }

        fn supported_commands(&self) -> &'static [CommandKind] {
            &[CommandKind::SwitchOn]
        }

        async fn handle(&self, message: &Message) -> Result<DeviceReply, DispatchError> {
            match message.kind() {
                CommandKind::SwitchOn => Ok(DeviceReply::empty().with_power(PowerState::On)),
                other => Err(self.unsupported(other)),
            }
        }
    }

    #[test]
    fn should_support_only_declared_kinds() {
        assert!(Doorbell.supports(CommandKind::SwitchOn));
        assert!(!Doorbell.supports(CommandKind::Flush));
    }

    #[test]
    fn should_name_device_in_unsupported_error() {
        let err = Doorbell.unsupported(CommandKind::Clean);
        match err {
            DispatchError::UnsupportedCommand(inner) => {
                assert_eq!(inner.device, "Doorbell");
                assert_eq!(inner.kind, CommandKind::Clean);
            }
            other => panic!("expected UnsupportedCommand, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_forward_calls_through_arc() {
        let bell = Arc::new(Doorbell);
        let msg = Message::new(DeviceId::new(), CommandKind::SwitchOn);
        let reply = bell.handle(&msg).await.unwrap();
        assert_eq!(reply.power, Some(PowerState::On));
        assert_eq!(Device::name(&bell), "Doorbell");
    }

    #[tokio::test]
    async fn should_reject_unknown_kind_without_panicking() {
        let msg = Message::new(DeviceId::new(), CommandKind::PlaySong);
        let result = Doorbell.handle(&msg).await;
        assert!(matches!(result, Err(DispatchError::UnsupportedCommand(_))));
    }
}
