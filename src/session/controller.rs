//! Session Controller
//!
//! Owns the interpreter subprocess and implements a synchronous "send
//! command, get full response" contract over its PTY: every operation
//! writes a line and accumulates output until the interpreter's prompt
//! marker arrives. Bytes read past a marker are kept as residue for the
//! next wait, so nothing is lost between exchanges.

use async_trait::async_trait;
use portable_pty::ChildKiller;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{InterpreterConfig, TimingConfig, VocabularyConfig};
use crate::error::{Error, Result};
use crate::pty::{spawn_interpreter, SpawnedInterpreter};

/// Substituted for interpreter output that cannot be decoded at all
const DECODE_FAILURE_TEXT: &str = "[output unreadable]";

/// Synchronous request/response contract over an interpreter session.
///
/// A trait seam so the crash-recovery runner can be driven by a scripted
/// double in tests.
#[async_trait]
pub trait GameSession: Send {
    /// Start (or restart) the interpreter; returns the banner text, or the
    /// boot command's response when one is configured
    async fn start(&mut self, width: u16, boot_command: Option<&str>) -> Result<String>;

    /// Send one command and return everything up to the next prompt
    async fn step(&mut self, command: &str) -> Result<String>;

    /// Attempt to restore from the save file; `false` when no save file
    /// exists or the interpreter did not acknowledge the restore
    async fn restore(&mut self) -> Result<bool>;

    /// Save the game, answering the overwrite confirmation if asked
    async fn save(&mut self) -> Result<()>;

    /// Kill the interpreter process, if any
    fn terminate(&mut self);
}

/// A live interpreter subprocess with its I/O state
struct LiveSession {
    spawned: SpawnedInterpreter,
    /// Bytes read past the last consumed marker
    residue: Vec<u8>,
}

/// Owns the interpreter subprocess and the prompt-matching protocol
pub struct SessionController {
    interpreter: InterpreterConfig,
    timing: TimingConfig,
    vocabulary: VocabularyConfig,
    live: Option<LiveSession>,
}

impl SessionController {
    /// Create a controller with no running interpreter
    pub fn new(
        interpreter: InterpreterConfig,
        timing: TimingConfig,
        vocabulary: VocabularyConfig,
    ) -> Self {
        Self {
            interpreter,
            timing,
            vocabulary,
            live: None,
        }
    }

    /// Whether an interpreter process is currently attached
    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    /// Send a line to the interpreter
    fn send_line(&mut self, line: &str) -> Result<()> {
        let live = self.live.as_mut().ok_or(Error::SessionNotRunning)?;
        live.spawned.streams.send_line(line)
    }

    /// Accumulate output until `marker` appears, within `timeout`.
    ///
    /// Returns the decoded text before the marker; bytes after it are kept
    /// for the next wait. `timeout_err` builds the fault reported when the
    /// deadline passes without a marker.
    async fn wait_for_marker(
        &mut self,
        marker: char,
        timeout: Duration,
        timeout_err: impl FnOnce() -> Error,
    ) -> Result<String> {
        let live = self.live.as_mut().ok_or(Error::SessionNotRunning)?;
        let marker = marker as u8;
        let deadline = Instant::now() + timeout;
        let mut buf = std::mem::take(&mut live.residue);

        loop {
            if let Some(pos) = buf.iter().position(|&b| b == marker) {
                live.residue = buf.split_off(pos + 1);
                buf.pop();
                return Ok(decode_output(&buf));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                live.residue = buf;
                return Err(timeout_err());
            }

            match live.spawned.streams.read_with_timeout(remaining).await {
                Ok(Some(bytes)) => buf.extend_from_slice(&bytes),
                Ok(None) => {
                    live.residue = buf;
                    return Err(timeout_err());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait up to `timeout` for `needle` to appear in the stream.
    ///
    /// Consumed bytes stay in the residue either way; absence of the needle
    /// within the window is an expected outcome, not an error.
    async fn wait_for_substring(&mut self, needle: &str, timeout: Duration) -> Result<bool> {
        let live = self.live.as_mut().ok_or(Error::SessionNotRunning)?;
        let deadline = Instant::now() + timeout;

        loop {
            if decode_output(&live.residue).contains(needle) {
                return Ok(true);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }

            match live.spawned.streams.read_with_timeout(remaining).await {
                Ok(Some(bytes)) => live.residue.extend_from_slice(&bytes),
                Ok(None) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl GameSession for SessionController {
    async fn start(&mut self, width: u16, boot_command: Option<&str>) -> Result<String> {
        // Exactly one live process at a time: kill any prior one first
        self.terminate();

        let args = {
            let mut cfg = self.interpreter.clone();
            cfg.text_width = width;
            cfg.spawn_args()
        };
        info!("starting interpreter: {} {:?}", self.interpreter.command, args);
        let spawned = spawn_interpreter(&self.interpreter.command, &args, width)?;
        self.live = Some(LiveSession {
            spawned,
            residue: Vec::new(),
        });

        let startup = self.timing.startup_timeout();
        let prompt = self.interpreter.prompt_marker;
        let banner = self
            .wait_for_marker(prompt, startup, || Error::StartupTimeout {
                duration: startup,
            })
            .await?;

        if let Some(boot) = boot_command {
            debug!("sending boot command '{}'", boot);
            self.send_line(boot)?;
            let step = self.timing.step_timeout();
            return self
                .wait_for_marker(prompt, step, || Error::PromptTimeout {
                    command: boot.to_string(),
                    duration: step,
                })
                .await;
        }

        Ok(banner)
    }

    async fn step(&mut self, command: &str) -> Result<String> {
        self.send_line(command)?;
        let step = self.timing.step_timeout();
        let prompt = self.interpreter.prompt_marker;
        self.wait_for_marker(prompt, step, || Error::PromptTimeout {
            command: command.to_string(),
            duration: step,
        })
        .await
    }

    async fn restore(&mut self) -> Result<bool> {
        if !self.interpreter.save_file.is_file() {
            debug!("no save file at {}", self.interpreter.save_file.display());
            return Ok(false);
        }

        let step = self.timing.step_timeout();
        let filename_marker = self.interpreter.filename_prompt_marker;
        let prompt = self.interpreter.prompt_marker;
        let restore_cmd = self.vocabulary.restore_command.clone();
        let save_path = self.interpreter.save_file.to_string_lossy().to_string();

        self.send_line(&restore_cmd)?;
        self.wait_for_marker(filename_marker, step, || Error::PromptTimeout {
            command: restore_cmd.clone(),
            duration: step,
        })
        .await?;

        self.send_line(&save_path)?;
        let response = self
            .wait_for_marker(prompt, step, || Error::PromptTimeout {
                command: save_path.clone(),
                duration: step,
            })
            .await?;

        // Heuristic: the interpreter acknowledges a successful restore with
        // a marker phrase somewhere in its response
        let restored = response.contains(&self.vocabulary.restore_success_marker);
        if restored {
            info!("restored game from {}", self.interpreter.save_file.display());
        } else {
            warn!("restore not acknowledged: {:?}", response);
        }
        Ok(restored)
    }

    async fn save(&mut self) -> Result<()> {
        let step = self.timing.step_timeout();
        let filename_marker = self.interpreter.filename_prompt_marker;
        let prompt = self.interpreter.prompt_marker;
        let save_cmd = self.vocabulary.save_command.clone();
        let save_path = self.interpreter.save_file.to_string_lossy().to_string();

        self.send_line(&save_cmd)?;
        self.wait_for_marker(filename_marker, step, || Error::PromptTimeout {
            command: save_cmd.clone(),
            duration: step,
        })
        .await?;

        self.send_line(&save_path)?;

        // The overwrite question only appears when the file already exists;
        // its absence within the short window is the normal case
        let overwrite_prompt = self.vocabulary.overwrite_prompt.clone();
        let confirm_window = self.timing.overwrite_confirm();
        if self.wait_for_substring(&overwrite_prompt, confirm_window).await? {
            let answer = self.vocabulary.overwrite_answer.clone();
            self.send_line(&answer)?;
        }

        self.wait_for_marker(prompt, step, || Error::PromptTimeout {
            command: save_path.clone(),
            duration: step,
        })
        .await?;
        debug!("saved game to {}", self.interpreter.save_file.display());
        Ok(())
    }

    fn terminate(&mut self) {
        if let Some(mut live) = self.live.take() {
            if let Err(e) = live.spawned.child.kill() {
                warn!("failed to kill interpreter: {}", e);
            }
            live.spawned.process.mark_terminated();
            debug!("terminated interpreter: {}", live.spawned.process);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Decode interpreter output bytes.
///
/// Strict UTF-8 first, WINDOWS-1252 as a best-effort fallback, and a fixed
/// placeholder when even that fails; callers never see a decode error.
/// Carriage returns are stripped and the text trimmed either way.
fn decode_output(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => clean_output(text),
        Err(_) => {
            let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                DECODE_FAILURE_TEXT.to_string()
            } else {
                clean_output(&text)
            }
        }
    }
}

fn clean_output(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}
