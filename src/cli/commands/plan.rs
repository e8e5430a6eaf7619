//! Plan command implementation.
//!
//! The `planflow plan` command plans a definition file and persists the plan.

use std::path::{Path, PathBuf};

use crate::definition::load_definition;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};
use super::display::show_flows;

/// The plan command implementation.
pub struct PlanCommand {
    store: PathBuf,
    definition: PathBuf,
}

impl PlanCommand {
    pub fn new(store: &Path, definition: PathBuf) -> Self {
        Self {
            store: store.to_path_buf(),
            definition,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let definition = load_definition(&self.definition)?;
        let mut world = open_world(&self.store);
        let plan = world.plan_definition(&definition)?;

        if plan.is_error() {
            ui.error(&format!("Planning '{}' failed", plan.name()));
            for step in plan.steps().filter(|s| s.error.is_some()) {
                if let Some(error) = &step.error {
                    ui.error(&format!("Step {}: {}", step.id, error));
                }
            }
            ui.output(plan.id());
            return Ok(CommandResult::failure(1));
        }

        ui.success(&format!("Planned '{}'", plan.name()));
        ui.output(plan.id());
        show_flows(ui, &plan);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    const COMMIT: &str = r#"
name: commit
actions:
  - name: ci
  - name: review
  - name: merge
    depends_on: [ci, review]
"#;

    #[test]
    fn plans_and_persists_definition() {
        let temp = TempDir::new().unwrap();
        let definition = temp.path().join("commit.yml");
        fs::write(&definition, COMMIT).unwrap();
        let store = temp.path().join("store");

        let mut ui = MockUI::new();
        let result = PlanCommand::new(&store, definition).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_success("Planned 'commit'"));
        let plan_id = ui.lines()[0].clone();
        let plan = open_world(&store).persisted_plan(&plan_id).unwrap();
        assert_eq!(plan.name(), "commit");
        assert!(ui.output_text().contains("7: merge (pending)"));
    }

    #[test]
    fn missing_definition_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let result = PlanCommand::new(temp.path(), temp.path().join("nope.yml")).execute(&mut ui);
        assert!(result.is_err());
    }
}
