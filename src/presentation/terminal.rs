//! Terminal-backed indicator and panel

use super::{Indicator, Panel};
use console::style;

/// Prints the indicator line to stdout whenever it becomes visible or its
/// text changes while visible.
pub struct TerminalIndicator {
    text: String,
    visible: bool,
    printed: Option<String>,
    no_emoji: bool,
    timestamps: bool,
}

impl TerminalIndicator {
    /// Plain indicator for one-shot commands
    pub fn new(no_emoji: bool) -> Self {
        Self {
            text: String::new(),
            visible: false,
            printed: None,
            no_emoji,
            timestamps: false,
        }
    }

    /// Indicator for long-running sessions: every line is timestamped and
    /// hiding is announced.
    pub fn live(no_emoji: bool) -> Self {
        Self {
            timestamps: true,
            ..Self::new(no_emoji)
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn prefix(&self) -> String {
        if self.timestamps {
            let time = chrono::Local::now().format("%H:%M:%S");
            format!("{} ", style(format!("[{}]", time)).dim())
        } else {
            String::new()
        }
    }
}

impl Indicator for TerminalIndicator {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        if self.visible && self.printed.as_deref() != Some(text) {
            self.show();
        }
    }

    fn show(&mut self) {
        self.visible = true;
        if self.printed.as_deref() == Some(self.text.as_str()) {
            return;
        }
        let icon = if self.no_emoji { "" } else { "🧭 " };
        println!("{}{}{}", self.prefix(), icon, style(&self.text).bold());
        self.printed = Some(self.text.clone());
    }

    fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.printed = None;
        if self.timestamps {
            println!("{}{}", self.prefix(), style("indicator hidden").dim());
        }
    }
}

/// Buffers report lines and writes them to stdout on `show`
#[derive(Default)]
pub struct TerminalPanel {
    lines: Vec<String>,
}

impl TerminalPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Panel for TerminalPanel {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn append_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn show(&mut self) {
        for line in self.lines.drain(..) {
            println!("{}", line);
        }
    }
}
