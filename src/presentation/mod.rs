//! Presentation sinks
//!
//! The controller pushes text into an [`Indicator`] (one short status
//! line) and reports into a [`Panel`] (scrollable text). Neither is owned
//! by the analysis code; the CLI supplies terminal-backed versions.

mod terminal;

pub use terminal::{TerminalIndicator, TerminalPanel};

/// At-a-glance status element showing the current average score
pub trait Indicator {
    fn set_text(&mut self, text: &str);
    fn show(&mut self);
    fn hide(&mut self);
}

/// Scrollable text output
pub trait Panel {
    fn clear(&mut self);
    fn append_line(&mut self, line: &str);
    fn show(&mut self);
}
