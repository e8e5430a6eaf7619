//! Finalize flow construction.
//!
//! Finalize steps always run one after another: in declaration order,
//! moved only as far as `finalize_depends_on` demands. The root action's
//! finalize step closes the sequence.

use std::collections::HashMap;

use super::dependency::DependencyGraph;
use crate::action::{ActionId, ActionNode, ActionTree, PlanItem};
use crate::error::{PlanError, Result};
use crate::flow::Flow;
use crate::steps::StepId;

/// Build the finalize flow for `tree`.
pub(crate) fn build(tree: &ActionTree) -> Result<Flow> {
    let mut declared = Vec::new();
    collect(tree.root(), &tree.root().items, &mut declared);

    let root = tree.root();
    let owner: HashMap<StepId, &ActionNode> = declared.iter().map(|(step, node)| (*step, *node)).collect();

    // Finalize steps standing for each action when something waits on it.
    let finalize_steps = |id: ActionId| -> Vec<StepId> {
        let Some(node) = tree.node(id) else {
            return Vec::new();
        };
        match node.finalize_step {
            Some(step) => vec![step],
            None => node
                .descendants()
                .iter()
                .filter_map(|descendant| descendant.finalize_step)
                .collect(),
        }
    };

    let graph = declared
        .iter()
        .fold(DependencyGraph::builder(), |builder, (step, node)| {
            let deps: Vec<StepId> = if node.id == root.id {
                declared
                    .iter()
                    .map(|(other, _)| *other)
                    .filter(|other| other != step)
                    .collect()
            } else {
                node.finalize_depends_on
                    .iter()
                    .flat_map(|dep| finalize_steps(*dep))
                    .filter(|other| other != step && owner.contains_key(other))
                    .collect()
            };
            builder.add_node(*step, deps)
        })
        .build()?;

    let Some(order) = graph.stable_topological_order() else {
        let cycle = graph.find_cycle().unwrap_or_default();
        return Err(PlanError::CyclicDependency {
            cycle: cycle
                .iter()
                .filter_map(|step| owner.get(step))
                .map(|node| format!("{}#{}", node.name, node.id))
                .collect::<Vec<_>>()
                .join(" -> "),
        });
    };

    Ok(Flow::Sequence(order.into_iter().map(Flow::Atom).collect()))
}

fn collect<'t>(node: &'t ActionNode, items: &'t [PlanItem], declared: &mut Vec<(StepId, &'t ActionNode)>) {
    for item in items {
        match item {
            PlanItem::Own => {
                if let Some(step) = node.finalize_step {
                    declared.push((step, node));
                }
            }
            PlanItem::Action(child) => collect(child, &child.items, declared),
            PlanItem::Group(_, inner) => collect(node, inner, declared),
        }
    }
}
