//! Message Spooler
//!
//! Decouples producer arrival rate from the consumer's processing rate.
//! The interpreter is always much slower than a live chat stream, so the
//! policy is "keep only the freshest": before each pull the consumer trims
//! the queue down to the lookback window, discarding the oldest entries.
//! Drops only ever remove from the front; surviving commands keep their
//! original relative order.

use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::models::Command;

/// Result of a bounded-timeout pull from the spooler
#[derive(Debug)]
pub enum Pull {
    /// The next pending command
    Command(Command),
    /// Nothing arrived within the timeout
    Empty,
    /// All producers have gone away
    Closed,
}

/// Producer half: clonable, shared by all producers
#[derive(Clone)]
pub struct CommandSender {
    tx: UnboundedSender<Command>,
}

impl CommandSender {
    /// Push a command into the queue. Returns false if the consumer has
    /// shut down.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Convenience: build and push a command
    pub fn submit(&self, author: impl Into<String>, text: impl Into<String>) -> bool {
        self.send(Command::new(author, text))
    }
}

/// Consumer half: the bounded-lookback queue plus draining policy
pub struct MessageSpooler {
    rx: UnboundedReceiver<Command>,
    lookback: usize,
}

/// Create a connected sender/spooler pair with the given lookback window
pub fn channel(lookback: usize) -> (CommandSender, MessageSpooler) {
    let (tx, rx) = unbounded_channel();
    (CommandSender { tx }, MessageSpooler { rx, lookback })
}

impl MessageSpooler {
    /// The configured lookback window
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Number of commands currently pending
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Trim the queue so at most lookback + 1 commands remain, removing
    /// the oldest first. Returns how many were dropped.
    pub fn spool_drop(&mut self) -> usize {
        let pending = self.rx.len();
        let keep = self.lookback + 1;
        if pending <= keep {
            return 0;
        }

        let excess = pending - keep;
        let mut dropped = 0;
        for _ in 0..excess {
            if self.rx.try_recv().is_ok() {
                dropped += 1;
            } else {
                break;
            }
        }
        if dropped > 0 {
            debug!("spooled past {} stale commands", dropped);
        }
        dropped
    }

    /// Blocking pop with a timeout, so the consumer can re-check its
    /// termination token on every idle cycle.
    pub async fn pull(&mut self, timeout: Duration) -> Pull {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(command)) => Pull::Command(command),
            Ok(None) => Pull::Closed,
            Err(_) => Pull::Empty,
        }
    }
}
