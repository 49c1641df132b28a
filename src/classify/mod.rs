//! Output Classifier
//!
//! A small deterministic grammar over raw interpreter text. Each line of a
//! response is either a status line (location plus score and move counters,
//! rendered as a header), a redundant echo of the command or the location
//! (dropped), or ordinary game text (kept verbatim).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CommandEcho, DisplayBlock, DisplayLine};

/// Status line: free text, then `Score:` (or `S:`) and an integer, then
/// `Moves:` (or `M:`) and an integer, either count possibly negative.
static STATUS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<location>.*\S)\s+(?:Score|S):\s*-?\d+\s+(?:Moves|M):\s*-?\d+")
        .expect("status line pattern is valid")
});

/// Classifies raw interpreter output into display blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputClassifier;

impl OutputClassifier {
    /// Create a new classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify one raw response into a display block.
    ///
    /// A non-empty `cmd` prepends a command-echo line attributed to
    /// `author`. Lines equal to the echoed command, or to the location
    /// extracted from a preceding status line, are dropped: interpreters
    /// echo the command and repeat the location name redundantly within the
    /// same response. A trailing blank spacer is always appended, so an
    /// empty response still yields a block with just the spacer.
    pub fn classify(&self, raw: &str, cmd: &str, author: &str) -> DisplayBlock {
        let mut block = if cmd.is_empty() {
            DisplayBlock::new()
        } else {
            DisplayBlock::with_echo(CommandEcho::new(author, cmd))
        };

        let mut location: Option<String> = None;

        if !raw.is_empty() {
            for line in raw.split('\n') {
                if let Some(caps) = STATUS_LINE.captures(line) {
                    location = Some(caps["location"].trim().to_string());
                    block.push(DisplayLine::header(line));
                } else if line == cmd || location.as_deref() == Some(line) {
                    // Redundant echo of the command or the location name
                    continue;
                } else {
                    block.push(DisplayLine::body(line));
                }
            }
        }

        // Trailing spacer separates consecutive blocks on the output device
        block.push(DisplayLine::body(""));
        block
    }

    /// Extract the location from a status line, if the line is one
    pub fn extract_location(&self, line: &str) -> Option<String> {
        STATUS_LINE
            .captures(line)
            .map(|caps| caps["location"].trim().to_string())
    }
}
