//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::plan::PlanResult;
use crate::steps::{StepId, StepState};

/// Planflow - plan workflows into run and finalize flows and track their steps.
#[derive(Debug, Parser)]
#[command(name = "planflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides default planflow.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding persisted plans (overrides settings and environment)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Print requested data and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plan a workflow definition and persist the plan
    Plan(PlanArgs),

    /// Show a persisted plan
    Show(ShowArgs),

    /// List persisted plans, newest first
    List(ListArgs),

    /// Move a step to a new state
    Step(StepArgs),

    /// Reset a failed step to pending
    Retry(RetryArgs),

    /// Skip every step of a plan that has not started
    Cancel(CancelArgs),

    /// Print the JSON schema of workflow definitions
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Workflow definition file (YAML)
    pub definition: PathBuf,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ShowArgs {
    /// Plan id
    pub plan_id: String,

    /// Output the serialized plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Results to include (comma-separated: pending, success, error)
    #[arg(short, long, value_delimiter = ',')]
    pub result: Vec<PlanResult>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Plans per page (defaults to the per_page setting)
    #[arg(long)]
    pub per_page: Option<usize>,
}

/// Arguments for the `step` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StepArgs {
    /// Plan id
    pub plan_id: String,

    /// Step id
    pub step_id: StepId,

    /// Target state (running, suspended, success, error, skipped)
    pub state: StepState,

    /// Error message, when moving the step to error
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Arguments for the `retry` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RetryArgs {
    /// Plan id
    pub plan_id: String,

    /// Failed step id
    pub step_id: StepId,
}

/// Arguments for the `cancel` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CancelArgs {
    /// Plan id
    pub plan_id: String,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["planflow", "show", "abc", "--store", "/tmp/s", "--json"])
            .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s")));
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.plan_id, "abc");
                assert!(args.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_result_filter_list() {
        let cli =
            Cli::try_parse_from(["planflow", "list", "--result", "error,pending", "--page", "2"])
                .unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.result, vec![PlanResult::Error, PlanResult::Pending]);
                assert_eq!(args.page, 2);
                assert_eq!(args.per_page, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_step_state() {
        let cli = Cli::try_parse_from(["planflow", "step", "abc", "3", "running"]).unwrap();
        match cli.command {
            Commands::Step(args) => {
                assert_eq!(args.step_id, 3);
                assert_eq!(args.state, StepState::Running);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_state() {
        assert!(Cli::try_parse_from(["planflow", "step", "abc", "3", "done"]).is_err());
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["planflow"]).is_err());
    }
}
