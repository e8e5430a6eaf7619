//! Cancel command implementation.
//!
//! The `planflow cancel` command skips every step that has not started.

use std::path::{Path, PathBuf};

use crate::cli::args::CancelArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};

/// The cancel command implementation.
pub struct CancelCommand {
    store: PathBuf,
    args: CancelArgs,
}

impl CancelCommand {
    pub fn new(store: &Path, args: CancelArgs) -> Self {
        Self {
            store: store.to_path_buf(),
            args,
        }
    }
}

impl Command for CancelCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut world = open_world(&self.store);
        let (plan, skipped) = world.cancel(&self.args.plan_id)?;

        if skipped.is_empty() {
            ui.warning("No pending steps to skip");
        } else {
            let ids: Vec<String> = skipped.iter().map(ToString::to_string).collect();
            ui.success(&format!("Skipped steps {}", ids.join(", ")));
        }
        ui.message(&format!("Plan state: {}", plan.state()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::plan::PlanState;
    use crate::steps::StepState;
    use crate::ui::MockUI;
    use serde_json::json;
    use tempfile::TempDir;

    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &str {
            "Ping"
        }
    }

    #[test]
    fn skips_pending_steps() {
        let temp = TempDir::new().unwrap();
        let mut world = open_world(temp.path());
        let plan = world.plan(&Ping, json!({})).unwrap();

        let mut ui = MockUI::new();
        let args = CancelArgs {
            plan_id: plan.id().to_string(),
        };
        CancelCommand::new(temp.path(), args).execute(&mut ui).unwrap();

        let plan = world.persisted_plan(plan.id()).unwrap();
        assert_eq!(plan.step(2).unwrap().state, StepState::Skipped);
        assert_eq!(plan.state(), PlanState::Stopped);
        assert!(ui.has_success("Skipped steps 2"));
    }
}
