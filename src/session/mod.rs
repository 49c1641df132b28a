//! Interpreter session management
//!
//! The controller owns the interpreter subprocess and turns the PTY byte
//! stream into a synchronous request/response protocol; the runner drives
//! it from the command queue and restarts it when it dies.

pub mod controller;
pub mod runner;

pub use controller::{GameSession, SessionController};
pub use runner::{RunnerConfig, SessionRunner};
