//! Turning a materialized action tree into run and finalize flows.
//!
//! Planning is a pure function over an [`ActionTree`]: no action callback
//! runs here. Independent actions end up as branches of a concurrence,
//! chains of data dependencies become sequences.
//!
//! # Example
//!
//! ```
//! use planflow::action::{Action, ActionTree, PlanContext};
//! use planflow::flow::Flow;
//! use planflow::planner::Planner;
//! use serde_json::{json, Value};
//!
//! struct Step(&'static str);
//! impl Action for Step {
//!     fn name(&self) -> &str { self.0 }
//! }
//!
//! struct Build;
//! impl Action for Build {
//!     fn name(&self) -> &str { "Build" }
//!     fn has_run(&self) -> bool { false }
//!
//!     fn plan(&self, ctx: &mut PlanContext<'_>, _input: Value) -> anyhow::Result<()> {
//!         let compile = ctx.plan_action(&Step("Compile"), json!({}));
//!         ctx.plan_action(&Step("Docs"), json!({}));
//!         ctx.plan_action(&Step("Package"), json!({ "binary": compile.output() }));
//!         Ok(())
//!     }
//! }
//!
//! let flows = Planner::plan(&ActionTree::build(&Build, json!({}))).unwrap();
//! assert_eq!(
//!     flows.run_flow,
//!     Flow::Concurrence(vec![
//!         Flow::Sequence(vec![Flow::Atom(3), Flow::Atom(7)]),
//!         Flow::Atom(5),
//!     ])
//! );
//! ```

pub mod dependency;
mod finalize_flow;
mod run_flow;

use tracing::debug;

use crate::action::ActionTree;
use crate::error::{PlanError, Result};
use crate::flow::Flow;

pub use dependency::{DependencyGraph, DependencyGraphBuilder};

/// The two flows of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFlows {
    pub run_flow: Flow,
    pub finalize_flow: Flow,
}

/// Builds flows from action trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planner;

impl Planner {
    /// Compute run and finalize flows for `tree`.
    ///
    /// Fails with [`PlanError::CyclicDependency`] when actions depend on
    /// each other in a cycle, either directly, through explicit groups or
    /// through finalize dependencies.
    pub fn plan(tree: &ActionTree) -> Result<PlannedFlows> {
        check_action_cycles(tree)?;

        let run_flow = run_flow::build(tree)?;
        let finalize_flow = finalize_flow::build(tree)?;
        debug!(
            "Planned {} run and {} finalize steps",
            run_flow.all_step_ids().len(),
            finalize_flow.all_step_ids().len()
        );

        Ok(PlannedFlows {
            run_flow,
            finalize_flow,
        })
    }
}

fn check_action_cycles(tree: &ActionTree) -> Result<()> {
    let nodes = tree.nodes();
    let graph = nodes
        .iter()
        .fold(DependencyGraph::builder(), |builder, node| {
            let deps = node
                .depends_on
                .iter()
                .copied()
                .filter(|dep| *dep != node.id);
            builder.add_node(node.id, deps)
        })
        .build()?;

    if let Some(cycle) = graph.find_cycle() {
        let path: Vec<String> = cycle
            .iter()
            .map(|id| match tree.node(*id) {
                Some(node) => format!("{}#{}", node.name, node.id),
                None => format!("#{}", id),
            })
            .collect();
        return Err(PlanError::CyclicDependency {
            cycle: path.join(" -> "),
        });
    }

    Ok(())
}
