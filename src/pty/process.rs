//! Interpreter Process Spawning
//!
//! Creates a pseudoterminal, spawns the interpreter inside it, and bridges
//! the blocking PTY master I/O to async code with a reader thread and a
//! writer thread connected by channels.

use portable_pty::{native_pty_system, Child, CommandBuilder, PtyPair, PtySize};
use std::io::{Read, Write};
use std::sync::mpsc::channel;
use std::thread;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, warn};

use super::streams::PtyStreams;
use crate::error::{Error, Result};
use crate::models::InterpreterProcess;

/// A spawned interpreter: its lifecycle record, the live child handle for
/// explicit termination, and the async-bridged I/O streams.
pub struct SpawnedInterpreter {
    /// Lifecycle record
    pub process: InterpreterProcess,
    /// Live child handle; killing it is how a session is torn down
    pub child: Box<dyn Child + Send + Sync>,
    /// Async-bridged PTY I/O
    pub streams: PtyStreams,
}

/// Spawn the interpreter on a PTY sized to `cols` columns
pub fn spawn_interpreter(
    command: &str,
    args: &[String],
    cols: u16,
) -> Result<SpawnedInterpreter> {
    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(PtySize {
            rows: 24,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::PtyCreationFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    let mut cmd_builder = CommandBuilder::new(command);
    cmd_builder.args(args);

    let child = pair
        .slave
        .spawn_command(cmd_builder)
        .map_err(|e| Error::InterpreterSpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    let pid = child.process_id().unwrap_or(0);

    let mut process = InterpreterProcess::new(command.to_string(), args.to_vec());
    process.mark_started(pid);
    debug!("spawned interpreter: {}", process);

    let streams = create_pty_streams(pair)?;

    Ok(SpawnedInterpreter {
        process,
        child,
        streams,
    })
}

/// Bridge the PTY master to channels via reader/writer threads
fn create_pty_streams(pair: PtyPair) -> Result<PtyStreams> {
    let mut master_reader =
        pair.master
            .try_clone_reader()
            .map_err(|e| Error::PtyReaderCloneFailed {
                reason: e.to_string(),
            })?;
    let mut master_writer = pair
        .master
        .take_writer()
        .map_err(|e| Error::PtyWriterTakeFailed {
            reason: e.to_string(),
        })?;

    // Channel: PTY output -> async consumer. The sender dropping on thread
    // exit is what signals EOF (process death) to the consumer.
    let (tx_out, rx_out) = unbounded_channel::<Vec<u8>>();
    // Channel: async producer (stdin) -> PTY writer thread
    let (tx_in, rx_in) = channel::<Vec<u8>>();

    // Reader thread: read from PTY master and forward to async channel
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        let mut consecutive_errors = 0;
        const MAX_CONSECUTIVE_ERRORS: u32 = 5;

        loop {
            match master_reader.read(&mut buf) {
                Ok(0) => {
                    debug!("PTY read EOF - interpreter terminated");
                    break;
                }
                Ok(n) => {
                    consecutive_errors = 0;
                    if tx_out.send(buf[..n].to_vec()).is_err() {
                        debug!("PTY read: receiver dropped, stopping reader thread");
                        break;
                    }
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::Interrupted {
                        continue;
                    }
                    if e.kind() == std::io::ErrorKind::WouldBlock {
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        continue;
                    }

                    consecutive_errors += 1;
                    warn!(
                        "PTY read error ({}): {} (attempt {}/{})",
                        e.kind(),
                        e,
                        consecutive_errors,
                        MAX_CONSECUTIVE_ERRORS
                    );

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("PTY read: too many consecutive errors, stopping reader thread");
                        break;
                    }

                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
            }
        }
        debug!("PTY reader thread exiting");
    });

    // Writer thread: receive command lines and write to PTY master
    thread::spawn(move || {
        while let Ok(data) = rx_in.recv() {
            let mut attempts = 0;
            const MAX_ATTEMPTS: u32 = 3;

            loop {
                match master_writer.write_all(&data) {
                    Ok(()) => {
                        if let Err(e) = master_writer.flush() {
                            debug!("PTY flush error: {}", e);
                        }
                        break;
                    }
                    Err(e) => {
                        attempts += 1;
                        if e.kind() == std::io::ErrorKind::Interrupted {
                            continue;
                        }
                        if e.kind() == std::io::ErrorKind::WouldBlock && attempts < MAX_ATTEMPTS {
                            std::thread::sleep(std::time::Duration::from_millis(10));
                            continue;
                        }

                        warn!("PTY write error ({}): {}", e.kind(), e);
                        return;
                    }
                }
            }
        }
        debug!("PTY writer thread exiting");
    });

    Ok(PtyStreams::from_channels(rx_out, tx_in))
}
