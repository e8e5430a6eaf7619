//! Planflow - an execution plan engine.
//!
//! A root [`action::Action`] plans itself into a tree of sub-actions. The
//! [`planner`] turns that tree into two execution-order trees over steps:
//! a run flow, ordering run steps by their data dependencies, and a
//! finalize flow, run once everything else succeeded. The resulting
//! [`plan::ExecutionPlan`] owns every step, derives its result and state
//! from the step states and is persisted through [`persistence`].
//!
//! # Modules
//!
//! - [`action`] - The `Action` trait, planning context and action tree
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading
//! - [`definition`] - Declarative YAML workflow definitions
//! - [`error`] - Error types and result aliases
//! - [`flow`] - Sequence/concurrence trees over step ids
//! - [`persistence`] - Storage adapters and plan queries
//! - [`plan`] - The execution plan aggregate
//! - [`planner`] - Run and finalize flow construction
//! - [`steps`] - Steps and their state machine
//! - [`ui`] - Terminal output and flow rendering
//! - [`world`] - Planning and step updates against a store
//!
//! # Example
//!
//! ```
//! use planflow::definition::{build_tree, parse_definition};
//! use planflow::flow::Flow;
//! use planflow::plan::ExecutionPlan;
//!
//! let definition = parse_definition(r#"
//! name: commit
//! actions:
//!   - name: ci
//!   - name: review
//!   - name: merge
//!     depends_on: [ci, review]
//! "#).unwrap();
//!
//! let plan = ExecutionPlan::from_tree(&build_tree(&definition).unwrap()).unwrap();
//! assert_eq!(
//!     plan.run_flow(),
//!     &Flow::sequence(vec![
//!         Flow::concurrence(vec![Flow::Atom(3), Flow::Atom(5)]),
//!         Flow::Atom(7),
//!     ])
//! );
//! ```

pub mod action;
pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod flow;
pub mod persistence;
pub mod plan;
pub mod planner;
pub mod steps;
pub mod ui;
pub mod world;

pub use error::{PlanError, Result};
