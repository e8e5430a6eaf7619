//! Run flow construction.
//!
//! Every run step and every explicit group becomes a placement unit. Units
//! of one declaration list are placed in declaration order, except that a
//! unit is deferred until the units providing its requirements are placed.
//! Placing into a concurrence follows three rules:
//!
//! - no existing branch holds a required step: the unit becomes a new branch
//! - exactly one branch does: the unit is appended to that branch
//! - several branches do: they are joined into a concurrence which the unit
//!   then follows in a new sequence
//!
//! Placing into a sequence simply appends.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::dependency::DependencyGraph;
use crate::action::{ActionId, ActionNode, ActionTree, GroupKind, PlanItem};
use crate::error::{PlanError, Result};
use crate::flow::Flow;
use crate::steps::StepId;

/// A piece of the run flow waiting to be placed.
#[derive(Debug, Clone)]
struct Unit {
    flow: Flow,
    provides: HashSet<StepId>,
    requires: HashSet<StepId>,
    label: String,
}

/// Build the run flow for `tree`.
pub(crate) fn build(tree: &ActionTree) -> Result<Flow> {
    let builder = RunFlowBuilder::new(tree);
    let root = tree.root();
    let units = builder.units_of(root, &root.items)?;
    let placed = place(GroupKind::Concurrence, units)?;
    Ok(placed.flow.normalize())
}

struct RunFlowBuilder<'t> {
    tree: &'t ActionTree,
    /// Run steps standing for each action when something depends on it.
    run_steps: HashMap<ActionId, Vec<StepId>>,
}

impl<'t> RunFlowBuilder<'t> {
    fn new(tree: &'t ActionTree) -> Self {
        let run_steps = tree
            .nodes()
            .into_iter()
            .map(|node| {
                let steps = match node.run_step {
                    Some(step) => vec![step],
                    None => node
                        .descendants()
                        .iter()
                        .filter_map(|descendant| descendant.run_step)
                        .collect(),
                };
                (node.id, steps)
            })
            .collect();

        Self { tree, run_steps }
    }

    /// Steps the run step of `node` has to wait for.
    fn requirements(&self, node: &ActionNode) -> HashSet<StepId> {
        node.depends_on
            .iter()
            .filter_map(|dep| self.run_steps.get(dep))
            .flatten()
            .copied()
            .filter(|step| Some(*step) != node.run_step)
            .collect()
    }

    fn label(&self, id: ActionId) -> String {
        match self.tree.node(id) {
            Some(node) => format!("{}#{}", node.name, node.id),
            None => format!("#{}", id),
        }
    }

    /// Placement units for the items of `node`, in declaration order.
    ///
    /// Sub-actions are flattened into the list; explicit groups are placed
    /// on their own and contribute a single unit.
    fn units_of(&self, node: &ActionNode, items: &[PlanItem]) -> Result<Vec<Unit>> {
        let mut units = Vec::new();

        for item in items {
            match item {
                PlanItem::Own => {
                    if let Some(step) = node.run_step {
                        units.push(Unit {
                            flow: Flow::Atom(step),
                            provides: HashSet::from([step]),
                            requires: self.requirements(node),
                            label: self.label(node.id),
                        });
                    }
                }
                PlanItem::Action(child) => units.extend(self.units_of(child, &child.items)?),
                PlanItem::Group(kind, inner) => {
                    let members = self.units_of(node, inner)?;
                    if !members.is_empty() {
                        units.push(place(*kind, members)?);
                    }
                }
            }
        }

        Ok(units)
    }
}

/// Place `units` into a fresh container and wrap the result as one unit.
fn place(kind: GroupKind, units: Vec<Unit>) -> Result<Unit> {
    let provides: HashSet<StepId> = units.iter().flat_map(|u| u.provides.iter().copied()).collect();
    let requires: HashSet<StepId> = units
        .iter()
        .flat_map(|u| u.requires.iter().copied())
        .filter(|step| !provides.contains(step))
        .collect();
    let label = format!(
        "{}[{}]",
        match kind {
            GroupKind::Sequence => "sequence",
            GroupKind::Concurrence => "concurrence",
        },
        units.iter().map(|u| u.label.as_str()).collect::<Vec<_>>().join(", ")
    );

    let mut container = Container::new(kind);
    for unit in placement_order(units)? {
        trace!("Placing {} into {:?}", unit.label, kind);
        container.add(unit.flow, &unit.requires);
    }

    Ok(Unit {
        flow: container.into_flow(),
        provides,
        requires,
        label,
    })
}

/// Declaration order, deferring units until their providers are placed.
fn placement_order(units: Vec<Unit>) -> Result<Vec<Unit>> {
    let provider: HashMap<StepId, usize> = units
        .iter()
        .enumerate()
        .flat_map(|(i, unit)| unit.provides.iter().map(move |step| (*step, i)))
        .collect();

    let graph = units
        .iter()
        .enumerate()
        .fold(DependencyGraph::builder(), |builder, (i, unit)| {
            let mut deps: Vec<usize> = unit
                .requires
                .iter()
                .filter_map(|step| provider.get(step).copied())
                .filter(|dep| *dep != i)
                .collect();
            deps.sort_unstable();
            builder.add_node(i, deps)
        })
        .build()?;

    let Some(order) = graph.stable_topological_order() else {
        let cycle = graph.find_cycle().unwrap_or_default();
        return Err(PlanError::CyclicDependency {
            cycle: cycle
                .iter()
                .map(|i| units[*i].label.as_str())
                .collect::<Vec<_>>()
                .join(" -> "),
        });
    };

    let mut slots: Vec<Option<Unit>> = units.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// A container being filled with placed flows.
#[derive(Debug)]
struct Container {
    kind: GroupKind,
    children: Vec<Flow>,
}

impl Container {
    fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    fn add(&mut self, flow: Flow, requires: &HashSet<StepId>) {
        if self.kind == GroupKind::Sequence {
            self.children.push(flow);
            return;
        }

        let hits: Vec<usize> = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| requires.iter().any(|step| child.contains(*step)))
            .map(|(i, _)| i)
            .collect();

        match hits.as_slice() {
            [] => self.children.push(flow),
            [single] => {
                let branch = std::mem::replace(&mut self.children[*single], Flow::Sequence(Vec::new()));
                self.children[*single] = match branch {
                    Flow::Sequence(mut steps) => {
                        steps.push(flow);
                        Flow::Sequence(steps)
                    }
                    other => Flow::Sequence(vec![other, flow]),
                };
            }
            [first, ..] => {
                let first = *first;
                let mut joined = Vec::with_capacity(hits.len());
                for i in hits.iter().rev() {
                    joined.push(self.children.remove(*i));
                }
                joined.reverse();
                self.children.insert(
                    first,
                    Flow::Sequence(vec![Flow::Concurrence(joined), flow]),
                );
            }
        }
    }

    fn into_flow(self) -> Flow {
        match self.kind {
            GroupKind::Sequence => Flow::sequence(self.children),
            GroupKind::Concurrence => Flow::concurrence(self.children),
        }
    }
}
