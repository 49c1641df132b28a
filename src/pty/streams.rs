//! PTY Streams
//!
//! Async-friendly interface over the interpreter's PTY, bridging the
//! blocking master reads/writes to async code using channels. End of
//! stream (the reader thread exiting because the interpreter died) is
//! surfaced as a distinct outcome so the crash-recovery loop can tell a
//! dead process from a slow one.

use crate::error::{Error, Result};
use std::sync::mpsc::Sender as StdSender;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// PTY I/O streams wrapper
pub struct PtyStreams {
    /// Receiver for output bytes from the PTY
    output_rx: UnboundedReceiver<Vec<u8>>,
    /// Sender for input bytes to the PTY
    input_tx: StdSender<Vec<u8>>,
}

impl PtyStreams {
    /// Create new PTY streams from channels
    pub fn from_channels(
        output_rx: UnboundedReceiver<Vec<u8>>,
        input_tx: StdSender<Vec<u8>>,
    ) -> Self {
        Self {
            output_rx,
            input_tx,
        }
    }

    /// Write raw bytes to the interpreter's stdin
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.input_tx
            .send(data.to_vec())
            .map_err(|e| Error::PtyInputSendFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Send a newline-terminated command line to the interpreter
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = line.as_bytes().to_vec();
        data.push(b'\n');
        self.write(&data)
    }

    /// Read the next chunk of output.
    ///
    /// Returns `None` when the stream has ended, which means the
    /// interpreter process has terminated.
    pub async fn read(&mut self) -> Option<Vec<u8>> {
        self.output_rx.recv().await
    }

    /// Read the next chunk of output with a timeout.
    ///
    /// Returns `Ok(Some(bytes))` on data, `Ok(None)` when the timeout
    /// elapses with nothing available, and `Err(ProcessTerminated)` when
    /// the stream has ended.
    pub async fn read_with_timeout(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        match tokio::time::timeout(timeout, self.output_rx.recv()).await {
            Ok(Some(bytes)) => Ok(Some(bytes)),
            Ok(None) => Err(Error::ProcessTerminated),
            Err(_) => Ok(None),
        }
    }

    /// Drain all pending output chunks, discarding them.
    ///
    /// Used when starting a fresh exchange to avoid stale output left over
    /// from a previous wait.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.output_rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}
