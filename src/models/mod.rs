//! Data models for printquest
//!
//! Core data structures shared across the crate: chat commands,
//! classified display blocks, and the interpreter process record.

pub mod command;
pub mod display_block;
pub mod interpreter;

pub use command::Command;
pub use display_block::{CommandEcho, DisplayBlock, DisplayLine, LineStyle};
pub use interpreter::{InterpreterProcess, InterpreterState};
