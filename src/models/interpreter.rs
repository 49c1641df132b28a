//! Interpreter Process Model
//!
//! Lifecycle record for the interpreter subprocess. This is bookkeeping
//! only; the live PTY child handle and streams are owned by the session
//! controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the state of the interpreter process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpreterState {
    /// Process record created but not started
    #[default]
    Created,
    /// Process is currently running
    Running,
    /// Process has terminated
    Terminated,
}

/// Lifecycle record for one interpreter subprocess
#[derive(Debug, Clone)]
pub struct InterpreterProcess {
    /// Unique identifier for this session
    pub id: Uuid,

    /// OS process identifier
    pub pid: Option<u32>,

    /// Current state of the process
    pub state: InterpreterState,

    /// When the process was started
    pub start_time: Option<DateTime<Utc>>,

    /// When the process terminated (if applicable)
    pub end_time: Option<DateTime<Utc>>,

    /// Interpreter binary that was executed
    pub command: String,

    /// Arguments passed to the interpreter
    pub args: Vec<String>,
}

impl InterpreterProcess {
    /// Create a new process record in the Created state
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pid: None,
            state: InterpreterState::Created,
            start_time: None,
            end_time: None,
            command,
            args,
        }
    }

    /// Mark the process as started with the given PID
    pub fn mark_started(&mut self, pid: u32) {
        self.pid = Some(pid);
        self.state = InterpreterState::Running;
        self.start_time = Some(Utc::now());
    }

    /// Mark the process as terminated
    pub fn mark_terminated(&mut self) {
        self.state = InterpreterState::Terminated;
        self.end_time = Some(Utc::now());
    }

    /// Check if the process is currently running
    pub fn is_running(&self) -> bool {
        matches!(self.state, InterpreterState::Running)
    }

    /// Check if the process has terminated
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, InterpreterState::Terminated)
    }
}

impl std::fmt::Display for InterpreterProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state_str = match self.state {
            InterpreterState::Created => "Created",
            InterpreterState::Running => "Running",
            InterpreterState::Terminated => "Terminated",
        };
        let pid_str = self.pid.map_or("N/A".to_string(), |pid| pid.to_string());
        write!(f, "{} [{}] - {}", self.command, pid_str, state_str)
    }
}
