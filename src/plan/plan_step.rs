//! The plan-step tree: who planned whom.

use serde::{Deserialize, Serialize};

use crate::action::{ActionId, ActionNode};
use crate::steps::StepId;

/// Planning step of one action, with the plan steps of its sub-actions.
///
/// The tree mirrors the action tree for display and audit. It says
/// nothing about execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStepNode {
    pub step_id: StepId,
    pub action_id: ActionId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanStepNode>,
}

impl PlanStepNode {
    pub fn from_action(node: &ActionNode) -> Self {
        Self {
            step_id: node.plan_step,
            action_id: node.id,
            children: node.children().into_iter().map(Self::from_action).collect(),
        }
    }

    /// Step ids of the whole tree, parents first.
    pub fn all_step_ids(&self) -> Vec<StepId> {
        let mut ids = vec![self.step_id];
        for child in &self.children {
            ids.extend(child.all_step_ids());
        }
        ids
    }

    /// Action ids of the whole tree, parents first.
    pub fn all_action_ids(&self) -> Vec<ActionId> {
        let mut ids = vec![self.action_id];
        for child in &self.children {
            ids.extend(child.all_action_ids());
        }
        ids
    }
}
