//! Program — an ordered batch of messages plus the discipline used to run it.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// How the messages of a [`Program`] are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// All messages at once, no ordering, fail-together.
    Parallel,
    /// One at a time in list order, fail-fast.
    Sequential,
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// A transient batch of messages: built by a caller, run once, discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub messages: Vec<Message>,
    pub discipline: Discipline,
}

impl Program {
    /// Program whose messages are dispatched concurrently.
    #[must_use]
    pub fn parallel(messages: Vec<Message>) -> Self {
        Self {
            messages,
            discipline: Discipline::Parallel,
        }
    }

    /// Program whose messages are dispatched one after the other.
    #[must_use]
    pub fn sequential(messages: Vec<Message>) -> Self {
        Self {
            messages,
            discipline: Discipline::Sequential,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
