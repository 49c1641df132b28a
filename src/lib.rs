//! printquest - a chat-driven interactive fiction session driver
//!
//! printquest runs a prompt-based interpreter (a Z-machine interpreter such
//! as `dfrotz`) as a subprocess and plays it with commands arriving
//! asynchronously from one or more producers, tolerating interpreter
//! crashes and preserving game progress across restarts through the
//! interpreter's own save file.
//!
//! ## Module Organization
//!
//! ### Core Functionality
//!
//! - [`session`] - Session controller (subprocess + prompt protocol) and
//!   the crash-recovery runner
//! - [`spool`] - Bounded-lookback command queue with drain-the-oldest
//!   backpressure
//! - [`classify`] - Raw interpreter text to structured display blocks
//! - [`pty`] - Interpreter process spawning and async-bridged PTY I/O
//! - [`models`] - Data structures (Command, DisplayBlock,
//!   InterpreterProcess)
//! - [`mod@error`] - Error types and Result aliases
//!
//! ### Edges
//!
//! - [`producers`] - Sources that push commands into the queue
//! - [`sink`] - Consumers of classified display blocks
//! - [`config`] - Configuration loading and validation
//!
//! ## Quick Start
//!
//! ```no_run
//! use printquest::config::Config;
//! use printquest::session::{RunnerConfig, SessionController, SessionRunner};
//! use printquest::sink::ConsoleSink;
//! use printquest::spool;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> printquest::error::Result<()> {
//! let config = Config::default();
//! let (sender, spooler) = spool::channel(config.spool.lookback);
//! let controller = SessionController::new(
//!     config.interpreter.clone(),
//!     config.timing.clone(),
//!     config.vocabulary.clone(),
//! );
//! let shutdown = CancellationToken::new();
//!
//! tokio::spawn(printquest::producers::stdin_producer(sender, shutdown.clone()));
//!
//! let runner = SessionRunner::new(
//!     controller,
//!     spooler,
//!     ConsoleSink::new(),
//!     RunnerConfig::from_config(&config),
//!     shutdown,
//! );
//! runner.run().await
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod producers;
pub mod pty;
pub mod session;
pub mod sink;
pub mod spool;

// Re-exports for convenience
pub use classify::OutputClassifier;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Command, CommandEcho, DisplayBlock, DisplayLine, LineStyle};
pub use session::{GameSession, RunnerConfig, SessionController, SessionRunner};
pub use sink::{ConsoleSink, Sink};
pub use spool::{CommandSender, MessageSpooler, Pull};
