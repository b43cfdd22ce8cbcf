//! Reports — per-message outcomes of a dispatch.
//!
//! Every message handed to the dispatcher ends up either as a [`Delivery`]
//! or as a [`MessageFailure`], identified by its index in the submitted list.

use crate::error::DispatchError;
use crate::id::ProgramId;
use crate::message::Message;
use crate::program::Discipline;
use crate::reply::DeviceReply;
use crate::time::Timestamp;

/// A message that was handled successfully.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Position of the message in the submitted list.
    pub index: usize,
    pub message: Message,
    pub reply: DeviceReply,
    /// When the device started handling the message.
    pub started_at: Timestamp,
    /// When the device returned its reply.
    pub finished_at: Timestamp,
}

/// A message that failed, with the reason.
#[derive(Debug, Clone, thiserror::Error)]
#[error("message #{index} ({message}) failed")]
pub struct MessageFailure {
    /// Position of the message in the submitted list.
    pub index: usize,
    pub message: Message,
    #[source]
    pub error: DispatchError,
}

/// Outcome of a parallel batch: all deliveries and all failures.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub deliveries: Vec<Delivery>,
    pub failures: Vec<MessageFailure>,
}

impl BatchReport {
    /// Number of messages accounted for (delivered + failed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.deliveries.len() + self.failures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when no message failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Indices of the failed messages, ascending.
    #[must_use]
    pub fn failed_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.failures.iter().map(|f| f.index).collect();
        indices.sort_unstable();
        indices
    }

    /// Order deliveries and failures by message index.
    pub fn sort_by_index(&mut self) {
        self.deliveries.sort_by_key(|d| d.index);
        self.failures.sort_by_key(|f| f.index);
    }
}

/// Outcome of a fully successful program run.
#[derive(Debug, Clone)]
pub struct ProgramReport {
    pub program_id: ProgramId,
    pub discipline: Discipline,
    /// One delivery per message, ordered by index.
    pub deliveries: Vec<Delivery>,
}

impl ProgramReport {
    /// Earliest start among the deliveries.
    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.deliveries.iter().map(|d| d.started_at).min()
    }

    /// Latest finish among the deliveries.
    #[must_use]
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.deliveries.iter().map(|d| d.finished_at).max()
    }
}
