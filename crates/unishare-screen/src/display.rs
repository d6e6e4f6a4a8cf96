//! Two-line display abstraction.
//!
//! The physical display is a 16x2 character LCD behind an external driver;
//! the node only needs "send a frame". [`Frame`] holds the two clipped
//! lines, [`DisplayLink`] is the seam, and [`TerminalDisplay`] is the
//! bundled stand-in that draws frames to the terminal.

use std::io::Write;

use thiserror::Error;

/// Characters per display line.
pub const FRAME_COLS: usize = 16;

/// One rendered display frame: two lines, each clipped to [`FRAME_COLS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    line1: String,
    line2: String,
}

impl Frame {
    /// Build a frame, clipping each line to the display width.
    #[must_use]
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self {
            line1: clip(line1.into()),
            line2: clip(line2.into()),
        }
    }

    /// Startup splash, shown until the first real render.
    #[must_use]
    pub fn splash() -> Self {
        Self::new("Home", "Monitor")
    }

    /// Shown when the registry pages across zero devices.
    #[must_use]
    pub fn no_devices() -> Self {
        Self::new("No devices", "found")
    }

    /// Shown when the paging bound addresses a slot with no record.
    #[must_use]
    pub fn no_data() -> Self {
        Self::new("No data", "")
    }

    /// The top line.
    #[must_use]
    pub fn line1(&self) -> &str {
        &self.line1
    }

    /// The bottom line.
    #[must_use]
    pub fn line2(&self) -> &str {
        &self.line2
    }
}

fn clip(line: String) -> String {
    if line.chars().count() <= FRAME_COLS {
        line
    } else {
        line.chars().take(FRAME_COLS).collect()
    }
}

/// Display errors.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The display was not found or failed to initialize. The one fatal
    /// condition in the node: halt visibly rather than run with a broken UI.
    #[error("display initialization failed: {0}")]
    Init(String),

    /// A frame could not be written.
    #[error("display write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// The display seam: anything that can show a two-line frame.
pub trait DisplayLink: Send {
    /// Initialize the display. Failure is fatal to the node.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Show one frame, replacing the previous one.
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

/// Draws frames to the terminal, standing in for the character LCD.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    /// Create a terminal display.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DisplayLink for TerminalDisplay {
    fn init(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "+{}+", "-".repeat(FRAME_COLS))?;
        writeln!(out, "|{:<width$}|", frame.line1(), width = FRAME_COLS)?;
        writeln!(out, "|{:<width$}|", frame.line2(), width = FRAME_COLS)?;
        writeln!(out, "+{}+", "-".repeat(FRAME_COLS))?;
        out.flush()?;
        Ok(())
    }
}
