//! Configuration management for printquest
//!
//! Configuration is split into sections: the interpreter invocation, the
//! timing envelope around every wait, the spool backpressure policy, and
//! the interpreter-specific vocabulary (forbidden commands, rejection
//! markers, protocol phrases). The vocabulary defaults are tied to one
//! specific interpreter family (frotz running Infocom-era games) and are
//! configuration, not protocol.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for printquest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpreter invocation
    pub interpreter: InterpreterConfig,

    /// Timing envelope
    pub timing: TimingConfig,

    /// Spool backpressure policy
    pub spool: SpoolConfig,

    /// Interpreter-specific vocabulary
    pub vocabulary: VocabularyConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.text_width == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "interpreter.text_width".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.interpreter.game_file.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "interpreter.game_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.interpreter.save_file.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "interpreter.save_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.timing.startup_timeout_ms == 0 || self.timing.step_timeout_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "timing".to_string(),
                reason: "timeouts must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// How to invoke and talk to the interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Interpreter binary
    pub command: String,

    /// Story file to load
    pub game_file: PathBuf,

    /// Save file path (owned by the interpreter; we only check existence)
    pub save_file: PathBuf,

    /// Display width in columns, passed to the interpreter and the PTY
    pub text_width: u16,

    /// Prompt marker the interpreter emits when ready for input
    pub prompt_marker: char,

    /// Marker the interpreter emits when asking for a file name
    pub filename_prompt_marker: char,

    /// Optional command sent once after the first prompt (e.g. a verbosity
    /// toggle); its response replaces the banner
    pub boot_command: Option<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command: "dfrotz".to_string(),
            game_file: PathBuf::from("zork1.z5"),
            save_file: PathBuf::from("zork1.sav"),
            text_width: 48,
            prompt_marker: '>',
            filename_prompt_marker: ':',
            boot_command: None,
        }
    }
}

impl InterpreterConfig {
    /// Arguments for spawning the interpreter: plain output, fixed width,
    /// then the story file.
    pub fn spawn_args(&self) -> Vec<String> {
        vec![
            "-p".to_string(),
            "-w".to_string(),
            self.text_width.to_string(),
            self.game_file.to_string_lossy().to_string(),
        ]
    }
}

/// Timeouts and delays around every wait in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait for the first prompt after spawn, in milliseconds
    pub startup_timeout_ms: u64,

    /// Wait for the prompt after each command, in milliseconds
    pub step_timeout_ms: u64,

    /// Window for the overwrite-confirmation question during save
    pub overwrite_confirm_ms: u64,

    /// How long the consumer blocks waiting for the next command
    pub pull_timeout_ms: u64,

    /// Pacing delay between accepted commands
    pub pacing_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            startup_timeout_ms: 5_000,
            step_timeout_ms: 5_000,
            overwrite_confirm_ms: 500,
            pull_timeout_ms: 10_000,
            pacing_delay_ms: 3_000,
        }
    }
}

impl TimingConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn overwrite_confirm(&self) -> Duration {
        Duration::from_millis(self.overwrite_confirm_ms)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_millis(self.pull_timeout_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }
}

/// Backpressure policy for the command queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Lookback window: at most lookback + 1 commands survive a drain
    pub lookback: usize,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self { lookback: 1 }
    }
}

/// Interpreter-specific vocabulary.
///
/// These are hard-coded phrases of one interpreter family, kept as data so
/// they can be adjusted without assuming they generalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Commands rejected locally before reaching the interpreter; these
    /// would desynchronize save/restore bookkeeping or are meaningless
    pub forbidden_commands: Vec<String>,

    /// Response substrings that mean the interpreter rejected the input;
    /// such interactions are dropped without display or save
    pub rejection_markers: Vec<String>,

    /// The interpreter's save command word
    pub save_command: String,

    /// The interpreter's restore command word
    pub restore_command: String,

    /// Substring that marks a successful restore in the interpreter's
    /// response. A heuristic string match, not a structured protocol.
    pub restore_success_marker: String,

    /// The overwrite-confirmation question asked during save
    pub overwrite_prompt: String,

    /// Affirmative answer to the overwrite question
    pub overwrite_answer: String,

    /// Author label attached to the synthetic post-restore interaction
    pub recovery_author: String,

    /// Command issued after a successful restore to resynchronize the
    /// displayed state
    pub recovery_command: String,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            forbidden_commands: vec![
                String::new(),
                "save".to_string(),
                "restore".to_string(),
                "restart".to_string(),
                "quit".to_string(),
                "brief".to_string(),
                "verbose".to_string(),
                "superbrief".to_string(),
            ],
            rejection_markers: vec![
                "I don't know the word".to_string(),
                "There was no verb in that sentence".to_string(),
            ],
            save_command: "save".to_string(),
            restore_command: "restore".to_string(),
            restore_success_marker: "Ok".to_string(),
            overwrite_prompt: "Overwrite existing file?".to_string(),
            overwrite_answer: "y".to_string(),
            recovery_author: "[AUTO RECOVERY]".to_string(),
            recovery_command: "look".to_string(),
        }
    }
}

impl VocabularyConfig {
    /// Whether a command is filtered locally (compared after trimming)
    pub fn is_forbidden(&self, command: &str) -> bool {
        let trimmed = command.trim();
        self.forbidden_commands
            .iter()
            .any(|c| c.eq_ignore_ascii_case(trimmed))
    }

    /// Whether a response indicates the interpreter rejected the input
    pub fn is_rejected(&self, response: &str) -> bool {
        self.rejection_markers.iter().any(|m| response.contains(m))
    }
}
