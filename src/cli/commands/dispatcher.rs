//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::persistence::FileAdapter;
use crate::ui::UserInterface;
use crate::world::World;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Open the plan store under `store`.
pub fn open_world(store: &Path) -> World<FileAdapter> {
    World::new(FileAdapter::new(store))
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    settings: Settings,
}

impl CommandDispatcher {
    pub fn new(project_root: PathBuf, settings: Settings) -> Self {
        Self {
            project_root,
            settings,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Directory of the plan store, resolved against the project root.
    pub fn store_path(&self) -> PathBuf {
        self.settings.store_path(&self.project_root)
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.store_path();
        match &cli.command {
            Commands::Plan(args) => {
                let definition = self.project_root.join(&args.definition);
                super::plan::PlanCommand::new(&store, definition).execute(ui)
            }
            Commands::Show(args) => super::show::ShowCommand::new(&store, args.clone()).execute(ui),
            Commands::List(args) => {
                super::list::ListCommand::new(&store, &self.settings, args.clone()).execute(ui)
            }
            Commands::Step(args) => super::step::StepCommand::new(&store, args.clone()).execute(ui),
            Commands::Retry(args) => {
                super::retry::RetryCommand::new(&store, args.clone()).execute(ui)
            }
            Commands::Cancel(args) => {
                super::cancel::CancelCommand::new(&store, args.clone()).execute(ui)
            }
            Commands::Schema => super::schema::SchemaCommand.execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
