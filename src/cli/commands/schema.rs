//! Schema command implementation.
//!
//! The `planflow schema` command prints the JSON schema of definition files,
//! for editor integration.

use crate::definition::definition_schema;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = serde_json::to_string_pretty(&definition_schema())?;
        ui.output(&schema);
        Ok(CommandResult::success())
    }
}
