//! Command-line interface for planflow.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    CancelArgs, Cli, Commands, CompletionsArgs, ListArgs, PlanArgs, RetryArgs, ShowArgs, StepArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
