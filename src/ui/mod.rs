//! Terminal output for the planflow command line.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] writing styled output to stdout
//! - [`MockUI`] capturing output in tests
//! - Plain-text rendering of flows and plan-step trees in [`tree`]
//!
//! # Example
//!
//! ```
//! use planflow::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Execution plan");
//! ui.output("Sequence");
//! assert_eq!(ui.lines(), ["Sequence"]);
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;
pub mod tree;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, PlanflowTheme};
pub use tree::{render_flow, render_plan_steps};

/// Trait for user interface interactions.
///
/// Commands only talk to this trait, so tests can swap in [`MockUI`].
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Styles matching this interface's color support.
    fn theme(&self) -> &PlanflowTheme;

    /// Print requested data; shown in every output mode.
    fn output(&mut self, line: &str);

    /// Display a status message.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Display an error; shown in every output mode.
    fn error(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);
}
