//! Serialized form of an execution plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PlanStepNode;
use crate::action::{ActionId, ActionRecord};
use crate::steps::{Step, StepId};

/// The plan document without its steps and actions.
///
/// Flows are kept as raw tagged trees so that decoding can report foreign
/// node kinds precisely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub root_plan_step: PlanStepNode,
    pub run_flow: Value,
    pub finalize_flow: Value,
    /// All step ids, ascending.
    pub step_ids: Vec<StepId>,
    /// All action ids, ascending.
    pub action_ids: Vec<ActionId>,
}

/// A complete plan: the document plus every step and action record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPlan {
    pub plan: PlanRecord,
    pub steps: Vec<Step>,
    pub actions: Vec<ActionRecord>,
}
