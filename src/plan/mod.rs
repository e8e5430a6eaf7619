//! The execution plan aggregate.
//!
//! An [`ExecutionPlan`] owns every step of a planned action tree, keyed by
//! id, together with the run and finalize flows over those ids. Its
//! `result` and `state` are always derived from the steps, never stored.
//!
//! Steps are mutated only through the plan, which enforces the step
//! transition table, sequential gating within flows and freezing once the
//! plan finished successfully.

mod plan_step;
mod record;
mod result;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::action::{resolve_output_refs, Action, ActionId, ActionRecord, ActionTree};
use crate::error::{PlanError, Result};
use crate::flow::Flow;
use crate::planner::Planner;
use crate::steps::{Phase, Step, StepError, StepId, StepState};

pub use plan_step::PlanStepNode;
pub use record::{PlanRecord, SerializedPlan};
pub use result::{result_of, PlanResult, PlanState};

/// A planned, possibly partially executed, action tree.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    id: String,
    created_at: DateTime<Utc>,
    root_plan_step: PlanStepNode,
    steps: BTreeMap<StepId, Step>,
    actions: BTreeMap<ActionId, ActionRecord>,
    run_flow: Flow,
    finalize_flow: Flow,
}

impl ExecutionPlan {
    /// Plan `action` with `input`.
    pub fn plan(action: &dyn Action, input: Value) -> Result<Self> {
        Self::from_tree(&ActionTree::build(action, input))
    }

    /// Build a plan from an already materialized action tree.
    pub fn from_tree(tree: &ActionTree) -> Result<Self> {
        let flows = Planner::plan(tree)?;

        let mut steps = BTreeMap::new();
        let mut actions = BTreeMap::new();

        for node in tree.nodes() {
            let mut plan_step = Step::new(node.plan_step, node.id, Phase::Plan);
            plan_step.started_at = Some(node.plan_started_at);
            plan_step.ended_at = node.plan_ended_at;
            match &node.plan_error {
                Some(error) => {
                    plan_step.state = StepState::Error;
                    plan_step.error = Some(error.clone());
                }
                None => plan_step.state = StepState::Success,
            }
            steps.insert(plan_step.id, plan_step);

            if let Some(id) = node.run_step {
                steps.insert(id, Step::new(id, node.id, Phase::Run));
            }
            if let Some(id) = node.finalize_step {
                steps.insert(id, Step::new(id, node.id, Phase::Finalize));
            }
            actions.insert(node.id, ActionRecord::from_node(node));
        }

        let plan = Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            root_plan_step: PlanStepNode::from_action(tree.root()),
            steps,
            actions,
            run_flow: flows.run_flow,
            finalize_flow: flows.finalize_flow,
        };

        info!(
            "Planned {} ({}) with {} steps",
            plan.id,
            tree.root().name,
            plan.steps.len()
        );
        Ok(plan)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn root_plan_step(&self) -> &PlanStepNode {
        &self.root_plan_step
    }

    /// All steps, ordered by id.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    pub fn step(&self, step_id: StepId) -> Option<&Step> {
        self.steps.get(&step_id)
    }

    /// All actions, ordered by id.
    pub fn actions(&self) -> impl Iterator<Item = &ActionRecord> {
        self.actions.values()
    }

    pub fn action(&self, action_id: ActionId) -> Option<&ActionRecord> {
        self.actions.get(&action_id)
    }

    /// Name of the root action.
    pub fn name(&self) -> &str {
        self.actions
            .get(&self.root_plan_step.action_id)
            .map_or("", |action| action.name.as_str())
    }

    pub fn run_flow(&self) -> &Flow {
        &self.run_flow
    }

    pub fn finalize_flow(&self) -> &Flow {
        &self.finalize_flow
    }

    /// Steps currently in `state`, ordered by id.
    pub fn steps_in_state(&self, state: StepState) -> Vec<&Step> {
        self.steps.values().filter(|step| step.state == state).collect()
    }

    fn state_of(&self, step_id: StepId) -> StepState {
        self.steps
            .get(&step_id)
            .map(|step| step.state)
            .unwrap_or_default()
    }

    fn phase_result(&self, phase: Phase) -> PlanResult {
        match phase {
            Phase::Plan => result_of(
                self.steps
                    .values()
                    .filter(|step| step.phase == Phase::Plan)
                    .map(|step| step.state),
            ),
            Phase::Run => result_of(
                self.run_flow
                    .all_step_ids()
                    .into_iter()
                    .map(|id| self.state_of(id)),
            ),
            Phase::Finalize => result_of(
                self.finalize_flow
                    .all_step_ids()
                    .into_iter()
                    .map(|id| self.state_of(id)),
            ),
        }
    }

    /// The phase the plan is in: the first one not finished with success.
    pub fn current_phase(&self) -> Phase {
        if self.phase_result(Phase::Plan) == PlanResult::Error {
            Phase::Plan
        } else if self.phase_result(Phase::Run) != PlanResult::Success {
            Phase::Run
        } else {
            Phase::Finalize
        }
    }

    /// Aggregated result over the active phase.
    ///
    /// A failed plan step makes the whole plan fail. The run flow is
    /// judged until it succeeds, the finalize flow afterwards.
    pub fn result(&self) -> PlanResult {
        match self.current_phase() {
            Phase::Plan => PlanResult::Error,
            phase => self.phase_result(phase),
        }
    }

    /// Whether the plan failed. Always derived from [`ExecutionPlan::result`].
    pub fn is_error(&self) -> bool {
        self.result() == PlanResult::Error
    }

    /// Lifecycle state derived from the steps.
    pub fn state(&self) -> PlanState {
        let executable = || self.steps.values().filter(|step| step.phase != Phase::Plan);
        let in_flight = executable()
            .any(|step| matches!(step.state, StepState::Running | StepState::Suspended));

        if !in_flight && self.result() != PlanResult::Pending {
            return PlanState::Stopped;
        }
        if executable().all(|step| step.state == StepState::Pending) {
            return PlanState::Planned;
        }
        match self.current_phase() {
            Phase::Finalize => PlanState::Finalizing,
            _ => PlanState::Running,
        }
    }

    /// Pending steps of the active phase whose predecessors all finished.
    pub fn ready_steps(&self) -> Vec<&Step> {
        let state_of = |id| self.state_of(id);
        let ready = match self.current_phase() {
            Phase::Plan => Vec::new(),
            Phase::Run => self.run_flow.ready_step_ids(&state_of),
            Phase::Finalize => self.finalize_flow.ready_step_ids(&state_of),
        };
        ready.into_iter().filter_map(|id| self.steps.get(&id)).collect()
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.result() == PlanResult::Success {
            return Err(PlanError::PlanFrozen {
                plan_id: self.id.clone(),
            });
        }
        Ok(())
    }

    fn executable_step(&self, step_id: StepId, to: StepState) -> Result<&Step> {
        let step = self
            .steps
            .get(&step_id)
            .ok_or(PlanError::UnknownStep { step_id })?;
        if step.phase == Phase::Plan {
            return Err(PlanError::InvalidStateTransition {
                step_id,
                from: step.state,
                to,
            });
        }
        Ok(step)
    }

    fn step_mut(&mut self, step_id: StepId) -> Result<&mut Step> {
        self.steps
            .get_mut(&step_id)
            .ok_or(PlanError::UnknownStep { step_id })
    }

    /// Whether `step_id` may leave `pending` for `running` right now.
    fn ensure_ready(&self, step: &Step) -> Result<()> {
        let state_of = |id| self.state_of(id);
        let ready = match step.phase {
            Phase::Plan => false,
            Phase::Run => self.current_phase() == Phase::Run
                && self.run_flow.predecessors_finished(step.id, &state_of) == Some(true),
            Phase::Finalize => self.current_phase() == Phase::Finalize
                && self.finalize_flow.predecessors_finished(step.id, &state_of) == Some(true),
        };

        if ready {
            Ok(())
        } else {
            Err(PlanError::StepNotReady { step_id: step.id })
        }
    }

    /// Move a step to `to`.
    ///
    /// Starting a pending step requires its flow predecessors to have
    /// finished with `success` or `skipped`, and finalize steps only start
    /// once the run phase succeeded.
    pub fn set_step_state(&mut self, step_id: StepId, to: StepState) -> Result<()> {
        self.ensure_mutable()?;
        let step = self.executable_step(step_id, to)?;
        if step.state == StepState::Pending && to == StepState::Running {
            self.ensure_ready(step)?;
        }

        let from = step.state;
        self.step_mut(step_id)?.set_state(to)?;
        debug!("Plan {}: step {} {} -> {}", self.id, step_id, from, to);
        Ok(())
    }

    /// Fail a running step with the given error details.
    pub fn record_step_error(&mut self, step_id: StepId, error: StepError) -> Result<()> {
        self.ensure_mutable()?;
        self.executable_step(step_id, StepState::Error)?;

        debug!("Plan {}: step {} failed: {}", self.id, step_id, error);
        self.step_mut(step_id)?.record_error(error)
    }

    /// Reset a failed step to `pending` so the coordinator can run it again.
    pub fn retry_step(&mut self, step_id: StepId) -> Result<()> {
        self.ensure_mutable()?;
        self.executable_step(step_id, StepState::Pending)?;

        self.step_mut(step_id)?.reset_for_retry()?;
        info!("Plan {}: step {} reset for retry", self.id, step_id);
        Ok(())
    }

    /// Cancel the plan by skipping every step that has not started yet.
    ///
    /// Returns the ids of the skipped steps.
    pub fn skip_remaining(&mut self) -> Result<Vec<StepId>> {
        self.ensure_mutable()?;

        let mut skipped = Vec::new();
        for step in self.steps.values_mut() {
            if step.phase != Phase::Plan && step.state == StepState::Pending {
                step.set_state(StepState::Skipped)?;
                skipped.push(step.id);
            }
        }

        info!("Plan {}: skipped {} remaining steps", self.id, skipped.len());
        Ok(skipped)
    }

    /// Store the output of an action once its run step produced it.
    pub fn record_output(&mut self, action_id: ActionId, output: Value) -> Result<()> {
        let action = self
            .actions
            .get_mut(&action_id)
            .ok_or_else(|| PlanError::UnknownAction {
                name: format!("#{}", action_id),
            })?;
        action.output = Some(output);
        Ok(())
    }

    /// The action's input with output references replaced by recorded outputs.
    pub fn resolved_input(&self, action_id: ActionId) -> Result<Value> {
        let action = self
            .actions
            .get(&action_id)
            .ok_or_else(|| PlanError::UnknownAction {
                name: format!("#{}", action_id),
            })?;

        Ok(resolve_output_refs(&action.input, &|id| {
            self.actions.get(&id).and_then(|other| other.output.clone())
        }))
    }

    /// Encode the plan document without its steps and actions.
    pub fn record(&self) -> PlanRecord {
        PlanRecord {
            id: self.id.clone(),
            created_at: self.created_at,
            root_plan_step: self.root_plan_step.clone(),
            run_flow: self.run_flow.to_value(),
            finalize_flow: self.finalize_flow.to_value(),
            step_ids: self.steps.keys().copied().collect(),
            action_ids: self.actions.keys().copied().collect(),
        }
    }

    /// Encode the whole plan.
    pub fn serialize(&self) -> SerializedPlan {
        SerializedPlan {
            plan: self.record(),
            steps: self.steps.values().cloned().collect(),
            actions: self.actions.values().cloned().collect(),
        }
    }

    /// Decode a plan, checking that its parts agree with each other.
    pub fn deserialize(serialized: SerializedPlan) -> Result<Self> {
        let SerializedPlan {
            plan,
            steps,
            actions,
        } = serialized;

        let run_flow = Flow::from_value(&plan.run_flow)?;
        let finalize_flow = Flow::from_value(&plan.finalize_flow)?;

        let restored = Self {
            id: plan.id,
            created_at: plan.created_at,
            root_plan_step: plan.root_plan_step,
            steps: steps.into_iter().map(|step| (step.id, step)).collect(),
            actions: actions.into_iter().map(|action| (action.id, action)).collect(),
            run_flow,
            finalize_flow,
        };

        restored.check_consistency(&plan.step_ids, &plan.action_ids)?;
        Ok(restored)
    }

    fn check_consistency(&self, step_ids: &[StepId], action_ids: &[ActionId]) -> Result<()> {
        let mismatch = |message: String| PlanError::DeserializationMismatch {
            plan_id: self.id.clone(),
            message,
        };

        let declared: HashSet<StepId> = step_ids.iter().copied().collect();
        let present: HashSet<StepId> = self.steps.keys().copied().collect();
        if declared != present {
            let mut missing: Vec<_> = declared.symmetric_difference(&present).copied().collect();
            missing.sort_unstable();
            return Err(mismatch(format!("step records differ from plan at ids {:?}", missing)));
        }

        let declared_actions: HashSet<ActionId> = action_ids.iter().copied().collect();
        let present_actions: HashSet<ActionId> = self.actions.keys().copied().collect();
        if declared_actions != present_actions {
            return Err(mismatch("action records differ from plan".to_string()));
        }

        for (flow, expected, label) in [
            (&self.run_flow, Phase::Run, "run"),
            (&self.finalize_flow, Phase::Finalize, "finalize"),
        ] {
            let mut seen = HashSet::new();
            for id in flow.all_step_ids() {
                let step = self
                    .steps
                    .get(&id)
                    .ok_or_else(|| mismatch(format!("{} flow references missing step {}", label, id)))?;
                if step.phase != expected {
                    return Err(mismatch(format!(
                        "{} flow references {} step {}",
                        label, step.phase, id
                    )));
                }
                if !seen.insert(id) {
                    return Err(mismatch(format!("step {} appears twice in {} flow", id, label)));
                }
            }

            let mut orphans: Vec<StepId> = self
                .steps
                .values()
                .filter(|step| step.phase == expected && !seen.contains(&step.id))
                .map(|step| step.id)
                .collect();
            if !orphans.is_empty() {
                orphans.sort_unstable();
                return Err(mismatch(format!(
                    "{} steps {:?} are missing from the {} flow",
                    expected, orphans, label
                )));
            }
        }

        for id in self.root_plan_step.all_step_ids() {
            if self.steps.get(&id).map(|step| step.phase) != Some(Phase::Plan) {
                return Err(mismatch(format!("plan step {} is missing", id)));
            }
        }

        if let Some(step) = self
            .steps
            .values()
            .find(|step| !self.actions.contains_key(&step.action_id))
        {
            return Err(mismatch(format!(
                "step {} belongs to unknown action {}",
                step.id, step.action_id
            )));
        }

        Ok(())
    }
}
