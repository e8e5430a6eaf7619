//! Retry command implementation.
//!
//! The `planflow retry` command resets a failed step to pending.

use std::path::{Path, PathBuf};

use crate::cli::args::RetryArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};

/// The retry command implementation.
pub struct RetryCommand {
    store: PathBuf,
    args: RetryArgs,
}

impl RetryCommand {
    pub fn new(store: &Path, args: RetryArgs) -> Self {
        Self {
            store: store.to_path_buf(),
            args,
        }
    }
}

impl Command for RetryCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut world = open_world(&self.store);
        let plan = world.retry_step(&self.args.plan_id, self.args.step_id)?;

        ui.success(&format!("Step {} reset to pending", self.args.step_id));
        ui.message(&format!("Plan result: {}", plan.result()));
        Ok(CommandResult::success())
    }
}
