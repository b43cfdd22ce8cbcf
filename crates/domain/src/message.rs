//! Message — one command addressed to one registered device.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// The closed set of commands a device may be asked to perform.
///
/// Devices interpret only the kinds they support and reject the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    SwitchOn,
    SwitchOff,
    ChangeColor,
    PlaySong,
    Open,
    Close,
    Flush,
    Clean,
}

impl CommandKind {
    /// Every command kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::SwitchOn,
        Self::SwitchOff,
        Self::ChangeColor,
        Self::PlaySong,
        Self::Open,
        Self::Close,
        Self::Flush,
        Self::Clean,
    ];

    /// Upper-case wire-style name, e.g. `"SWITCH_ON"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SwitchOn => "SWITCH_ON",
            Self::SwitchOff => "SWITCH_OFF",
            Self::ChangeColor => "CHANGE_COLOR",
            Self::PlaySong => "PLAY_SONG",
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::Flush => "FLUSH",
            Self::Clean => "CLEAN",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable command value: target device, command kind, optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    target: DeviceId,
    kind: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

impl Message {
    /// Create a message without a payload.
    #[must_use]
    pub fn new(target: DeviceId, kind: CommandKind) -> Self {
        Self {
            target,
            kind,
            payload: None,
        }
    }

    /// Create a message carrying a payload (song title, colour, …).
    #[must_use]
    pub fn with_payload(target: DeviceId, kind: CommandKind, payload: impl Into<String>) -> Self {
        Self {
            target,
            kind,
            payload: Some(payload.into()),
        }
    }

    #[must_use]
    pub fn target(&self) -> DeviceId {
        self.target
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "{}:{}({payload})", self.target, self.kind),
            None => write!(f, "{}:{}", self.target, self.kind),
        }
    }
}
