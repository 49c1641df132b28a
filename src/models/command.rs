//! Command Model
//!
//! A single player command submitted by a producer: who sent it and the
//! raw text to forward to the interpreter. Commands are immutable once
//! created; ordering is arrival order into the shared queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player command with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Display name of whoever submitted the command
    pub author: String,

    /// The command text as typed
    pub text: String,

    /// When the command arrived
    pub received_at: DateTime<Utc>,
}

impl Command {
    /// Create a new command stamped with the current time
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] '{}'", self.author, self.text)
    }
}
