//! Show command implementation.
//!
//! The `planflow show` command prints one persisted plan.

use std::path::{Path, PathBuf};

use crate::cli::args::ShowArgs;
use crate::error::{PlanError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};
use super::display::show_plan;

/// The show command implementation.
pub struct ShowCommand {
    store: PathBuf,
    args: ShowArgs,
}

impl ShowCommand {
    pub fn new(store: &Path, args: ShowArgs) -> Self {
        Self {
            store: store.to_path_buf(),
            args,
        }
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let world = open_world(&self.store);
        let plan = match world.persisted_plan(&self.args.plan_id) {
            Ok(plan) => plan,
            Err(PlanError::PlanNotFound { plan_id }) => {
                ui.error(&format!("No plan with id '{}'", plan_id));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&plan.serialize())?;
            ui.output(&json);
        } else {
            show_plan(ui, &plan);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::ui::MockUI;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct Ping;

    impl Action for Ping {
        fn name(&self) -> &str {
            "Ping"
        }
    }

    fn args(plan_id: &str, json: bool) -> ShowArgs {
        ShowArgs {
            plan_id: plan_id.to_string(),
            json,
        }
    }

    #[test]
    fn unknown_plan_fails_with_exit_code_2() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = ShowCommand::new(temp.path(), args("missing", false))
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No plan with id 'missing'"));
    }

    #[test]
    fn json_output_is_the_serialized_plan() {
        let temp = TempDir::new().unwrap();
        let plan = open_world(temp.path()).plan(&Ping, json!({})).unwrap();
        let mut ui = MockUI::new();

        ShowCommand::new(temp.path(), args(plan.id(), true))
            .execute(&mut ui)
            .unwrap();

        let value: Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(value["plan"]["id"], json!(plan.id()));
        assert_eq!(value["steps"].as_array().unwrap().len(), 2);
    }
}
