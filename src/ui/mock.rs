//! Mock UI implementation for testing.
//!
//! `MockUI` implements [`UserInterface`] with a plain theme and captures
//! every interaction for later assertion.
//!
//! # Example
//!
//! ```
//! use planflow::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("Planned");
//! ui.error("boom");
//!
//! assert!(ui.has_success("Planned"));
//! assert!(ui.has_error("boom"));
//! ```

use super::{OutputMode, PlanflowTheme, UserInterface};

/// Captures UI interactions.
#[derive(Debug)]
pub struct MockUI {
    mode: OutputMode,
    theme: PlanflowTheme,
    lines: Vec<String>,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
}

impl Default for MockUI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUI {
    pub fn new() -> Self {
        Self::with_mode(OutputMode::Normal)
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: PlanflowTheme::plain(),
            lines: Vec::new(),
            messages: Vec::new(),
            successes: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Lines passed to [`UserInterface::output`].
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All output lines joined with newlines.
    pub fn output_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Whether any captured message contains `msg`.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn theme(&self) -> &PlanflowTheme {
        &self.theme
    }

    fn output(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }
}
