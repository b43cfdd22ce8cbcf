//! Error types shared across the workspace.
//!
//! Devices and the dispatcher speak [`DispatchError`]. Variants carry typed
//! context (the target id, the rejected kind, the failing message) so a caller
//! can tell exactly which message failed and why.

use crate::id::DeviceId;
use crate::message::CommandKind;
use crate::report::{BatchReport, MessageFailure};

/// Error returned while resolving or executing messages.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// The target identifier was never handed out by the registry.
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    /// The device does not implement the requested command kind.
    #[error(transparent)]
    UnsupportedCommand(#[from] UnsupportedCommandError),

    /// The device handler panicked while running inside a batch task.
    #[error("handler of device {target} panicked")]
    HandlerPanicked { target: DeviceId },

    /// A sequential run stopped at its first failing message.
    #[error("sequence aborted: {completed} completed before failure")]
    SequenceAborted {
        /// Messages delivered before the failure.
        completed: usize,
        #[source]
        failure: Box<MessageFailure>,
    },

    /// At least one message of a parallel batch failed.
    #[error("batch failed: {} of {} message(s) failed", .0.failures.len(), .0.len())]
    BatchFailed(BatchReport),
}

/// A device was handed a command kind outside its declared set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device {device} does not support {kind}")]
pub struct UnsupportedCommandError {
    /// Name of the rejecting device.
    pub device: String,
    pub kind: CommandKind,
}
