//! The materialized action tree.
//!
//! Planning happens in two passes. The first pass runs the actions' plan
//! callbacks and records everything they declared into an [`ActionTree`],
//! which is plain data. The second pass (the planner) turns the finished
//! tree into run and finalize flows without calling back into any action.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::context::{IdAllocator, PlanContext};
use super::{Action, ActionId};
use crate::steps::{StepError, StepId};

/// Kind of an explicit grouping opened by a plan callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Sequence,
    Concurrence,
}

/// One entry of an action's declaration list, in declaration order.
#[derive(Debug, Clone)]
pub enum PlanItem {
    /// The position where the action registered its own run/finalize steps.
    Own,
    /// A spawned sub-action.
    Action(ActionNode),
    /// An explicit sequence or concurrence group.
    Group(GroupKind, Vec<PlanItem>),
}

/// A planned action with everything it declared.
#[derive(Debug, Clone)]
pub struct ActionNode {
    pub id: ActionId,
    pub name: String,
    pub input: Value,
    pub plan_step: StepId,
    pub run_step: Option<StepId>,
    pub finalize_step: Option<StepId>,
    /// Actions whose output this action's run step needs.
    pub depends_on: Vec<ActionId>,
    /// Actions whose finalize steps must precede this action's.
    pub finalize_depends_on: Vec<ActionId>,
    pub items: Vec<PlanItem>,
    pub plan_started_at: DateTime<Utc>,
    pub plan_ended_at: Option<DateTime<Utc>>,
    /// Set when the plan callback failed.
    pub plan_error: Option<StepError>,
}

impl ActionNode {
    pub(crate) fn new(id: ActionId, name: &str, input: Value, plan_step: StepId) -> Self {
        Self {
            id,
            name: name.to_string(),
            input,
            plan_step,
            run_step: None,
            finalize_step: None,
            depends_on: Vec::new(),
            finalize_depends_on: Vec::new(),
            items: Vec::new(),
            plan_started_at: Utc::now(),
            plan_ended_at: None,
            plan_error: None,
        }
    }

    /// Direct sub-actions, looking through explicit groups.
    pub fn children(&self) -> Vec<&ActionNode> {
        let mut children = Vec::new();
        collect_children(&self.items, &mut children);
        children
    }

    /// This node and all descendants, parents before children.
    pub fn descendants(&self) -> Vec<&ActionNode> {
        let mut nodes = vec![self];
        for child in self.children() {
            nodes.extend(child.descendants());
        }
        nodes
    }

    /// Find a node in this subtree.
    pub fn find(&self, id: ActionId) -> Option<&ActionNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().into_iter().find_map(|child| child.find(id))
    }

    /// Find a node in this subtree for amendment before planning.
    pub fn find_mut(&mut self, id: ActionId) -> Option<&mut ActionNode> {
        if self.id == id {
            return Some(self);
        }
        find_in_items_mut(&mut self.items, id)
    }
}

fn collect_children<'a>(items: &'a [PlanItem], children: &mut Vec<&'a ActionNode>) {
    for item in items {
        match item {
            PlanItem::Own => {}
            PlanItem::Action(node) => children.push(node),
            PlanItem::Group(_, inner) => collect_children(inner, children),
        }
    }
}

fn find_in_items_mut(items: &mut [PlanItem], id: ActionId) -> Option<&mut ActionNode> {
    for item in items {
        let found = match item {
            PlanItem::Own => None,
            PlanItem::Action(node) => node.find_mut(id),
            PlanItem::Group(_, inner) => find_in_items_mut(inner, id),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

/// A fully materialized action tree, ready for the planner.
#[derive(Debug, Clone)]
pub struct ActionTree {
    root: ActionNode,
    step_count: StepId,
}

impl ActionTree {
    /// Run `action`'s plan callback (and those of everything it spawns).
    ///
    /// Failing callbacks do not abort the build: the failure is kept on the
    /// node and shows up as an errored plan step.
    pub fn build(action: &dyn Action, input: Value) -> Self {
        let mut ids = IdAllocator::default();
        let root = PlanContext::plan_root(&mut ids, action, input);

        Self {
            root,
            step_count: ids.step_count(),
        }
    }

    pub fn root(&self) -> &ActionNode {
        &self.root
    }

    /// Look up a node by action id.
    pub fn node(&self, id: ActionId) -> Option<&ActionNode> {
        self.root.find(id)
    }

    /// Look up a node for amendment (e.g. adding dependencies declared by name).
    pub fn node_mut(&mut self, id: ActionId) -> Option<&mut ActionNode> {
        self.root.find_mut(id)
    }

    /// All nodes, parents before children, in declaration order.
    pub fn nodes(&self) -> Vec<&ActionNode> {
        self.root.descendants()
    }

    /// Number of step ids allocated while building.
    pub fn step_count(&self) -> StepId {
        self.step_count
    }
}
