//! Error types and Result aliases for printquest

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for printquest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for printquest
#[derive(Debug)]
pub enum Error {
    // === Session faults (recoverable by the crash-recovery loop) ===
    /// No prompt arrived within the startup wait after spawning
    StartupTimeout {
        duration: Duration,
    },

    /// No prompt arrived within the step wait after sending a command
    PromptTimeout {
        command: String,
        duration: Duration,
    },

    /// The interpreter process exited (end of output stream)
    ProcessTerminated,

    // === PTY-related errors ===
    /// Failed to create PTY
    PtyCreationFailed {
        command: String,
        reason: String,
    },

    /// Failed to spawn interpreter in PTY
    InterpreterSpawnFailed {
        command: String,
        reason: String,
    },

    /// Failed to clone PTY reader
    PtyReaderCloneFailed {
        reason: String,
    },

    /// Failed to take PTY writer
    PtyWriterTakeFailed {
        reason: String,
    },

    /// Failed to send input to PTY
    PtyInputSendFailed {
        reason: String,
    },

    /// No interpreter session is currently running
    SessionNotRunning,

    // === Sink errors ===
    /// The display sink rejected a block
    SinkWriteFailed {
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    /// Regex compilation errors
    Regex(regex::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl Error {
    /// Whether this error is a subprocess-protocol fault the crash-recovery
    /// loop handles by restarting the session, rather than a hard failure.
    pub fn is_session_fault(&self) -> bool {
        matches!(
            self,
            Error::StartupTimeout { .. }
                | Error::PromptTimeout { .. }
                | Error::ProcessTerminated
                | Error::PtyInputSendFailed { .. }
                | Error::SessionNotRunning
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Session faults
            Error::StartupTimeout { duration } => {
                write!(f, "No prompt within {:?} after interpreter start", duration)
            }
            Error::PromptTimeout { command, duration } => {
                write!(f, "No prompt within {:?} after command '{}'", duration, command)
            }
            Error::ProcessTerminated => {
                write!(f, "Interpreter process terminated")
            }

            // PTY errors
            Error::PtyCreationFailed { command, reason } => {
                write!(f, "Failed to create PTY for '{}': {}", command, reason)
            }
            Error::InterpreterSpawnFailed { command, reason } => {
                write!(f, "Failed to spawn interpreter '{}': {}", command, reason)
            }
            Error::PtyReaderCloneFailed { reason } => {
                write!(f, "Failed to clone PTY reader: {}", reason)
            }
            Error::PtyWriterTakeFailed { reason } => {
                write!(f, "Failed to take PTY writer: {}", reason)
            }
            Error::PtyInputSendFailed { reason } => {
                write!(f, "Failed to send input to PTY: {}", reason)
            }
            Error::SessionNotRunning => {
                write!(f, "No interpreter session is running")
            }

            // Sink errors
            Error::SinkWriteFailed { reason } => {
                write!(f, "Display sink rejected block: {}", reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),
            Error::Regex(err) => write!(f, "Regex compilation error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Regex(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
