//! Step command implementation.
//!
//! The `planflow step` command applies a state transition to one step and
//! persists it. Moving a step to `error` records the given message.

use std::path::{Path, PathBuf};

use crate::cli::args::StepArgs;
use crate::error::Result;
use crate::steps::{StepError, StepState};
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};
use super::display::show_flows;

/// The step command implementation.
pub struct StepCommand {
    store: PathBuf,
    args: StepArgs,
}

impl StepCommand {
    pub fn new(store: &Path, args: StepArgs) -> Self {
        Self {
            store: store.to_path_buf(),
            args,
        }
    }
}

impl Command for StepCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut world = open_world(&self.store);
        let StepArgs {
            plan_id,
            step_id,
            state,
            message,
        } = &self.args;

        let plan = if *state == StepState::Error {
            let message = message.as_deref().unwrap_or("failed");
            world.record_step_error(plan_id, *step_id, StepError::new(message))?
        } else {
            world.set_step_state(plan_id, *step_id, *state)?
        };

        ui.success(&format!("Step {} is {}", step_id, state));
        ui.message(&format!("Plan result: {}", plan.result()));
        show_flows(ui, &plan);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::error::PlanError;
    use crate::ui::MockUI;
    use serde_json::json;
    use tempfile::TempDir;

    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &str {
            "Ping"
        }
    }

    fn step(plan_id: &str, state: StepState, message: Option<&str>) -> StepArgs {
        StepArgs {
            plan_id: plan_id.to_string(),
            step_id: 2,
            state,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn transitions_are_persisted() {
        let temp = TempDir::new().unwrap();
        let plan = open_world(temp.path()).plan(&Ping, json!({})).unwrap();
        let mut ui = MockUI::new();

        StepCommand::new(temp.path(), step(plan.id(), StepState::Running, None))
            .execute(&mut ui)
            .unwrap();
        StepCommand::new(temp.path(), step(plan.id(), StepState::Error, Some("timeout")))
            .execute(&mut ui)
            .unwrap();

        let plan = open_world(temp.path()).persisted_plan(plan.id()).unwrap();
        let failed = plan.step(2).unwrap();
        assert_eq!(failed.state, StepState::Error);
        assert_eq!(failed.error.as_ref().unwrap().message, "timeout");
        assert!(ui.has_message("Plan result: error"));
    }

    #[test]
    fn invalid_transition_is_an_error() {
        let temp = TempDir::new().unwrap();
        let plan = open_world(temp.path()).plan(&Ping, json!({})).unwrap();
        let mut ui = MockUI::new();

        let result = StepCommand::new(temp.path(), step(plan.id(), StepState::Success, None))
            .execute(&mut ui);

        assert!(matches!(
            result,
            Err(PlanError::InvalidStateTransition { step_id: 2, .. })
        ));
    }
}
