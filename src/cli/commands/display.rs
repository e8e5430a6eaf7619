//! Shared display helpers for plans.
//!
//! Used by `plan`, `show`, `step`, `retry` and `cancel` so every command
//! prints a plan the same way.

use crate::plan::ExecutionPlan;
use crate::steps::StepState;
use crate::ui::{render_flow, render_plan_steps, UserInterface};

/// One-line summary: id, name, result, state and creation time.
pub fn plan_summary_line(plan: &ExecutionPlan, ui: &dyn UserInterface) -> String {
    let theme = ui.theme();
    format!(
        "{}  {}  {}  {}  {}",
        plan.id(),
        theme.highlight.apply_to(plan.name()),
        theme.format_result(plan.result()),
        plan.state(),
        theme.dim.apply_to(plan.created_at().format("%Y-%m-%d %H:%M:%S"))
    )
}

/// Print the run and finalize flows with step states.
pub fn show_flows(ui: &mut dyn UserInterface, plan: &ExecutionPlan) {
    let theme = ui.theme().clone();

    ui.output(&format!("{}", theme.key.apply_to("Run flow:")));
    for line in render_flow(plan.run_flow(), plan, &theme) {
        ui.output(&format!("  {}", line));
    }

    ui.output(&format!("{}", theme.key.apply_to("Finalize flow:")));
    for line in render_flow(plan.finalize_flow(), plan, &theme) {
        ui.output(&format!("  {}", line));
    }
}

/// Print a full plan: attributes, plan-step tree, flows and step errors.
pub fn show_plan(ui: &mut dyn UserInterface, plan: &ExecutionPlan) {
    let theme = ui.theme().clone();
    let key = |label: &str| format!("{}", theme.key.apply_to(label));

    ui.output(&format!("{} {}", key("Plan:"), plan.id()));
    ui.output(&format!("{} {}", key("Action:"), plan.name()));
    ui.output(&format!(
        "{} {}",
        key("Created:"),
        plan.created_at().to_rfc3339()
    ));
    ui.output(&format!(
        "{} {}",
        key("Result:"),
        theme.format_result(plan.result())
    ));
    ui.output(&format!("{} {}", key("State:"), plan.state()));
    ui.output(&format!("{} {}", key("Phase:"), plan.current_phase()));

    ui.output(&key("Plan steps:"));
    for line in render_plan_steps(plan, &theme) {
        ui.output(&format!("  {}", line));
    }

    show_flows(ui, plan);

    let ready: Vec<String> = plan.ready_steps().iter().map(|s| s.id.to_string()).collect();
    if !ready.is_empty() {
        ui.output(&format!("{} {}", key("Ready:"), ready.join(", ")));
    }

    for step in plan.steps_in_state(StepState::Error) {
        if let Some(error) = &step.error {
            ui.error(&format!("Step {} failed: {}", step.id, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::ui::MockUI;
    use serde_json::json;

    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &str {
            "Ping"
        }
    }

    #[test]
    fn show_plan_prints_attributes_and_flows() {
        let plan = ExecutionPlan::plan(&Ping, json!({})).unwrap();
        let mut ui = MockUI::new();

        show_plan(&mut ui, &plan);

        let text = ui.output_text();
        assert!(text.contains(&format!("Plan: {}", plan.id())));
        assert!(text.contains("Result: pending"));
        assert!(text.contains("State: planned"));
        assert!(text.contains("Run flow:\n  2: Ping (pending)"));
        assert!(text.contains("Finalize flow:\n  Sequence"));
        assert!(text.contains("Ready: 2"));
        assert!(ui.errors().is_empty());
    }

    #[test]
    fn show_plan_reports_step_errors() {
        let mut plan = ExecutionPlan::plan(&Ping, json!({})).unwrap();
        plan.set_step_state(2, StepState::Running).unwrap();
        plan.record_step_error(2, crate::steps::StepError::new("timeout"))
            .unwrap();
        let mut ui = MockUI::new();

        show_plan(&mut ui, &plan);

        assert!(ui.has_error("Step 2 failed: timeout"));
        assert!(ui.output_text().contains("Result: error"));
    }

    #[test]
    fn summary_line_names_result_and_state() {
        let plan = ExecutionPlan::plan(&Ping, json!({})).unwrap();
        let ui = MockUI::new();

        let line = plan_summary_line(&plan, &ui);
        assert!(line.starts_with(plan.id()));
        assert!(line.contains("Ping  pending  planned"));
    }
}
