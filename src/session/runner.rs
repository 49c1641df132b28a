//! Session Runner
//!
//! The crash-recovery state machine composing the session controller, the
//! message spooler, and the output classifier:
//!
//! `Booting -> Interacting -> (Crashed -> Booting)* -> Terminated`
//!
//! Interpreter crashes are expected, not fatal: any session fault re-enters
//! Booting, and because the save file persists progress the player sees a
//! short replay from the last save rather than total loss. Only the
//! cancellation token stops the loop.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::classify::OutputClassifier;
use crate::config::{Config, TimingConfig, VocabularyConfig};
use crate::error::Result;
use crate::models::{Command, DisplayBlock, DisplayLine};
use crate::session::GameSession;
use crate::sink::Sink;
use crate::spool::{MessageSpooler, Pull};

/// Substituted when the sink refuses a block, so one bad author or command
/// never aborts the session
const APOLOGY_TEXT: &str = "[this message could not be displayed]";

/// Runner parameters, extracted from the top-level configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Display width passed to the interpreter at each start
    pub text_width: u16,
    /// Optional command sent once after the first prompt
    pub boot_command: Option<String>,
    /// Timing envelope
    pub timing: TimingConfig,
    /// Interpreter vocabulary (forbidden commands, rejection markers,
    /// recovery identity)
    pub vocabulary: VocabularyConfig,
}

impl RunnerConfig {
    /// Extract runner parameters from the top-level configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            text_width: config.interpreter.text_width,
            boot_command: config.interpreter.boot_command.clone(),
            timing: config.timing.clone(),
            vocabulary: config.vocabulary.clone(),
        }
    }
}

/// Drives one interpreter session from the command queue to the sink
pub struct SessionRunner<S: GameSession, K: Sink> {
    session: S,
    spooler: MessageSpooler,
    classifier: OutputClassifier,
    sink: K,
    config: RunnerConfig,
    shutdown: CancellationToken,
}

impl<S: GameSession, K: Sink> SessionRunner<S, K> {
    /// Create a runner over a session, a spooler, and a sink
    pub fn new(
        session: S,
        spooler: MessageSpooler,
        sink: K,
        config: RunnerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            session,
            spooler,
            classifier: OutputClassifier::new(),
            sink,
            config,
            shutdown,
        }
    }

    /// Run until cancelled. Session faults restart the interpreter and
    /// re-enter the boot phase; anything else is a hard error.
    pub async fn run(mut self) -> Result<()> {
        let result = loop {
            if self.shutdown.is_cancelled() {
                break Ok(());
            }
            match self.boot_and_play().await {
                Ok(()) => break Ok(()),
                Err(e) if e.is_session_fault() => {
                    warn!("session crashed ({}), restarting", e);
                    continue;
                }
                Err(e) => {
                    error!("unrecoverable error: {}", e);
                    break Err(e);
                }
            }
        };

        self.session.terminate();
        self.sink.stream_lost();
        result
    }

    /// One Booting phase followed by the Interacting loop.
    ///
    /// Returns `Ok(())` only on orderly termination; session faults bubble
    /// up to `run` which re-enters this function.
    async fn boot_and_play(&mut self) -> Result<()> {
        // Booting: start the interpreter and try to pick up where we left off
        let banner = self
            .session
            .start(self.config.text_width, self.config.boot_command.as_deref())
            .await?;

        if self.session.restore().await? {
            // The restore response itself is not displayable; issue a
            // synthetic look to resynchronize the displayed state
            let cmd = self.config.vocabulary.recovery_command.clone();
            let author = self.config.vocabulary.recovery_author.clone();
            let response = self.session.step(&cmd).await?;
            let block = self.classifier.classify(&response, &cmd, &author);
            self.emit(&block);
        } else {
            let block = self.classifier.classify(&banner, "", "");
            self.emit(&block);
        }

        // Interacting
        loop {
            if self.shutdown.is_cancelled() {
                return Ok(());
            }

            let dropped = self.spooler.spool_drop();
            if dropped > 0 {
                info!("...skipping {} messages...", dropped);
            }

            match self.spooler.pull(self.config.timing.pull_timeout()).await {
                Pull::Empty => {
                    debug!("...waiting for new messages...");
                }
                Pull::Closed => {
                    info!("command stream closed");
                    self.shutdown.cancel();
                    return Ok(());
                }
                Pull::Command(command) => {
                    self.interact(command).await?;
                }
            }
        }
    }

    /// One accepted-command cycle: filter, step, classify, emit, autosave,
    /// pace.
    async fn interact(&mut self, command: Command) -> Result<()> {
        info!("{}", command);

        if self.config.vocabulary.is_forbidden(&command.text) {
            debug!("dropping forbidden command '{}'", command.text);
            return Ok(());
        }

        let response = self.session.step(&command.text).await?;

        if self.config.vocabulary.is_rejected(&response) {
            debug!("interpreter rejected '{}'", command.text);
            return Ok(());
        }

        let block = self
            .classifier
            .classify(&response, &command.text, &command.author);
        self.emit(&block);

        self.session.save().await?;

        // Pacing delay, cut short by cancellation
        tokio::select! {
            _ = tokio::time::sleep(self.config.timing.pacing_delay()) => {}
            _ = self.shutdown.cancelled() => {}
        }
        Ok(())
    }

    /// Emit a block, substituting a fixed apology when the sink refuses it
    fn emit(&mut self, block: &DisplayBlock) {
        if let Err(e) = self.sink.emit(block) {
            warn!("sink rejected block: {}", e);
            let mut apology = DisplayBlock::new();
            apology.push(DisplayLine::body(APOLOGY_TEXT));
            apology.push(DisplayLine::body(""));
            if let Err(e) = self.sink.emit(&apology) {
                warn!("sink rejected apology block: {}", e);
            }
        }
    }
}
