//! Display sinks
//!
//! A sink consumes ordered display blocks produced by the session runner.
//! It owns all rendering and transport concerns and is only ever called
//! from the single consumer task. The console sink here renders blocks to
//! stdout; a printer transport plugs in through the same trait.

use std::io::Write;

use crate::error::{Error, Result};
use crate::models::{DisplayBlock, LineStyle};

/// Consumer of classified display blocks
pub trait Sink: Send {
    /// Render one block; called once per accepted interaction
    fn emit(&mut self, block: &DisplayBlock) -> Result<()>;

    /// Final notification when the command stream is gone
    fn stream_lost(&mut self);
}

/// Renders display blocks to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Create a new console sink
    pub fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    fn emit(&mut self, block: &DisplayBlock) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        if let Some(echo) = &block.echo {
            writeln!(out, "{}", echo.format_line()).map_err(|e| Error::SinkWriteFailed {
                reason: e.to_string(),
            })?;
        }

        for line in &block.lines {
            match line.style {
                // Inverse video for status lines
                LineStyle::Header => writeln!(out, "\x1b[7m{}\x1b[0m", line.text),
                LineStyle::Body => writeln!(out, "{}", line.text),
            }
            .map_err(|e| Error::SinkWriteFailed {
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    fn stream_lost(&mut self) {
        println!("[stream lost]");
    }
}
