//! Text rendering of flows and plan-step trees.
//!
//! Each node is one line; children are indented by two spaces. Steps read
//! `<id>: <action> (<state>)`.

use crate::flow::Flow;
use crate::plan::{ExecutionPlan, PlanStepNode};
use crate::steps::StepId;

use super::PlanflowTheme;

const INDENT: &str = "  ";

/// Render `flow` with the names and states of `plan`'s steps.
pub fn render_flow(flow: &Flow, plan: &ExecutionPlan, theme: &PlanflowTheme) -> Vec<String> {
    let mut lines = Vec::new();
    push_flow(&mut lines, flow, 0, plan, theme);
    lines
}

fn push_flow(
    lines: &mut Vec<String>,
    flow: &Flow,
    depth: usize,
    plan: &ExecutionPlan,
    theme: &PlanflowTheme,
) {
    match flow {
        Flow::Atom(step_id) => lines.push(step_line(*step_id, depth, plan, theme)),
        Flow::Sequence(children) | Flow::Concurrence(children) => {
            let label = match flow {
                Flow::Sequence(_) => "Sequence",
                _ => "Concurrence",
            };
            lines.push(format!(
                "{}{}",
                INDENT.repeat(depth),
                theme.container.apply_to(label)
            ));
            for child in children {
                push_flow(lines, child, depth + 1, plan, theme);
            }
        }
    }
}

/// Render the plan-step tree, one line per action.
pub fn render_plan_steps(plan: &ExecutionPlan, theme: &PlanflowTheme) -> Vec<String> {
    let mut lines = Vec::new();
    push_plan_step(&mut lines, plan.root_plan_step(), 0, plan, theme);
    lines
}

fn push_plan_step(
    lines: &mut Vec<String>,
    node: &PlanStepNode,
    depth: usize,
    plan: &ExecutionPlan,
    theme: &PlanflowTheme,
) {
    lines.push(step_line(node.step_id, depth, plan, theme));
    for child in &node.children {
        push_plan_step(lines, child, depth + 1, plan, theme);
    }
}

fn step_line(step_id: StepId, depth: usize, plan: &ExecutionPlan, theme: &PlanflowTheme) -> String {
    let indent = INDENT.repeat(depth);
    let Some(step) = plan.step(step_id) else {
        return format!("{}{}: {}", indent, step_id, theme.error.apply_to("<missing>"));
    };

    let name = plan
        .action(step.action_id)
        .map(|action| action.name.as_str())
        .unwrap_or("?");

    format!(
        "{}{}: {} ({})",
        indent,
        step_id,
        theme.highlight.apply_to(name),
        theme.format_state(step.state)
    )
}
