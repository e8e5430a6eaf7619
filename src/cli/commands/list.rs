//! List command implementation.
//!
//! The `planflow list` command pages through persisted plans, newest first.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::persistence::PlanFilter;
use crate::ui::UserInterface;

use super::dispatcher::{open_world, Command, CommandResult};
use super::display::plan_summary_line;

/// The list command implementation.
pub struct ListCommand {
    store: PathBuf,
    filter: PlanFilter,
}

impl ListCommand {
    /// Arguments left unset fall back to `settings`.
    pub fn new(store: &Path, settings: &Settings, args: ListArgs) -> Self {
        let results = if args.result.is_empty() {
            settings.default_result_filter.clone()
        } else {
            args.result
        };

        Self {
            store: store.to_path_buf(),
            filter: PlanFilter {
                results,
                page: args.page,
                per_page: args.per_page.unwrap_or(settings.per_page),
            },
        }
    }

    pub fn filter(&self) -> &PlanFilter {
        &self.filter
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let world = open_world(&self.store);
        let page = world.persisted_plans(&self.filter)?;

        if page.plans.is_empty() {
            ui.message("No plans found.");
            return Ok(CommandResult::success());
        }

        for plan in &page.plans {
            let line = plan_summary_line(plan, ui);
            ui.output(&line);
        }
        ui.message(&format!(
            "Page {} of {} ({} plans)",
            page.page,
            page.pages(),
            page.total
        ));

        Ok(CommandResult::success())
    }
}
