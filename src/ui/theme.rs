//! Visual theme and styling.

use console::Style;

use crate::plan::PlanResult;
use crate::steps::StepState;

/// Styles used when printing plans.
#[derive(Debug, Clone)]
pub struct PlanflowTheme {
    /// Success messages and successful steps (green).
    pub success: Style,
    /// Warnings (orange).
    pub warning: Style,
    /// Errors and failed steps (red bold).
    pub error: Style,
    /// Running and suspended steps (magenta).
    pub info: Style,
    /// Pending and skipped steps, secondary text.
    pub dim: Style,
    pub highlight: Style,
    pub header: Style,
    /// Flow container labels.
    pub container: Style,
    /// Labels in key-value displays.
    pub key: Style,
}

impl Default for PlanflowTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanflowTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().magenta(),
            container: Style::new().cyan(),
            key: Style::new().bold(),
        }
    }

    /// A theme without colors (for non-TTY output and tests).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            container: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Style for a step in `state`.
    pub fn state_style(&self, state: StepState) -> &Style {
        match state {
            StepState::Pending | StepState::Skipped => &self.dim,
            StepState::Running | StepState::Suspended => &self.info,
            StepState::Success => &self.success,
            StepState::Error => &self.error,
        }
    }

    pub fn format_state(&self, state: StepState) -> String {
        format!("{}", self.state_style(state).apply_to(state))
    }

    pub fn format_result(&self, result: PlanResult) -> String {
        let style = match result {
            PlanResult::Pending => &self.dim,
            PlanResult::Success => &self.success,
            PlanResult::Error => &self.error,
        };
        format!("{}", style.apply_to(result))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
