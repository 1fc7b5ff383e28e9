//! Surfaces outside the widget panels that echo the countdown.

use std::io::stdout;

use crossterm::{execute, terminal::SetTitle};
use tracing::warn;

pub trait DisplayMirror {
    fn show(&mut self, text: &str);
    /// Puts the surface back to its neutral value.
    fn restore(&mut self);
}

/// Mirrors into the terminal window title.
pub struct TerminalTitle {
    neutral: String,
}

impl TerminalTitle {
    pub fn new(neutral: &str) -> Self {
        Self {
            neutral: neutral.to_string(),
        }
    }

    fn set(&self, title: &str) {
        if let Err(err) = execute!(stdout(), SetTitle(title)) {
            warn!(%err, "could not update terminal title");
        }
    }
}

impl DisplayMirror for TerminalTitle {
    fn show(&mut self, text: &str) {
        self.set(&format!("{} - {}", text, self.neutral));
    }

    fn restore(&mut self) {
        self.set(&self.neutral);
    }
}

pub struct NullMirror;

impl DisplayMirror for NullMirror {
    fn show(&mut self, _text: &str) {}

    fn restore(&mut self) {}
}
