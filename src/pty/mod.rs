//! Pseudoterminal management for the interpreter subprocess
//!
//! Spawns the interpreter on a PTY sized to the display width and bridges
//! its blocking I/O to async code via background threads and channels.

pub mod process;
pub mod streams;

pub use process::{spawn_interpreter, SpawnedInterpreter};
pub use streams::PtyStreams;
