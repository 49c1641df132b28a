//! Command producers
//!
//! Producers push `(author, text)` pairs into the shared command queue and
//! run as independent tasks doing their own blocking I/O. The stdin
//! producer here reads local line input; a chat-stream producer plugs in
//! through the same `CommandSender`.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::spool::CommandSender;

/// Author attached to commands typed on the local console
const STDIN_AUTHOR: &str = "console";

/// Read newline-terminated commands from stdin and submit them until the
/// input closes or the token is cancelled.
pub async fn stdin_producer(sender: CommandSender, shutdown: CancellationToken) {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("stdin producer cancelled");
                break;
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(text)) => {
                        if !sender.submit(STDIN_AUTHOR, text.trim().to_string()) {
                            debug!("command queue closed, stopping stdin producer");
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        debug!("stdin read error: {}", e);
                        break;
                    }
                }
            }
        }
    }
}
