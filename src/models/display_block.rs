//! Display Block Model
//!
//! The structured form of one interpreter interaction, ready for a sink to
//! render: an optional command echo line, followed by classified output
//! lines. Blocks are created per interaction, handed to the sink, and
//! discarded; nothing in the core retains them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authors longer than this are truncated in the echo line
const ECHO_AUTHOR_MAX: usize = 15;

/// Truncated authors keep this many characters before the ellipsis marker
const ECHO_AUTHOR_KEEP: usize = 13;

/// Visual style of a classified output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    /// Status line (location, score, move count) rendered distinctly
    Header,
    /// Ordinary game text, preserved verbatim
    Body,
}

/// One line of classified interpreter output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayLine {
    /// The line text
    pub text: String,

    /// How the sink should render it
    pub style: LineStyle,
}

impl DisplayLine {
    /// Create a header line
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::Header,
        }
    }

    /// Create a body line
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LineStyle::Body,
        }
    }
}

/// The echoed command that introduced a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEcho {
    /// Who submitted the command
    pub author: String,

    /// The command text
    pub command: String,
}

impl CommandEcho {
    /// Create a new command echo
    pub fn new(author: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            command: command.into(),
        }
    }

    /// Render the echo as a single printable line.
    ///
    /// Long author names are truncated to keep the line within a narrow
    /// display; an empty author renders as a bare prompt.
    pub fn format_line(&self) -> String {
        let mut line = if self.author.chars().count() > ECHO_AUTHOR_MAX {
            let truncated: String = self.author.chars().take(ECHO_AUTHOR_KEEP).collect();
            format!("{}..", truncated)
        } else {
            self.author.clone()
        };
        line.push_str(if self.author.is_empty() { "> " } else { " > " });
        line.push_str(&self.command);
        line
    }
}

/// An ordered block of display lines for one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayBlock {
    /// Leading command echo, when the interaction came from a command
    pub echo: Option<CommandEcho>,

    /// Classified output lines, in original order
    pub lines: Vec<DisplayLine>,

    /// When this block was produced
    pub created_at: DateTime<Utc>,
}

impl DisplayBlock {
    /// Create an empty block
    pub fn new() -> Self {
        Self {
            echo: None,
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create an empty block with a leading command echo
    pub fn with_echo(echo: CommandEcho) -> Self {
        Self {
            echo: Some(echo),
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a classified line
    pub fn push(&mut self, line: DisplayLine) {
        self.lines.push(line);
    }

    /// Number of classified lines (excluding the echo)
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block has no classified lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for DisplayBlock {
    fn default() -> Self {
        Self::new()
    }
}
