//! The consumer-facing facade.
//!
//! A [`World`] plans actions, persists the resulting plans and applies
//! step updates coming from the execution layer, saving each changed step
//! as it goes.
//!
//! # Example
//!
//! ```
//! use planflow::action::Action;
//! use planflow::persistence::MemoryAdapter;
//! use planflow::plan::PlanResult;
//! use planflow::steps::StepState;
//! use planflow::world::World;
//! use serde_json::json;
//!
//! struct Ping;
//! impl Action for Ping {
//!     fn name(&self) -> &str { "Ping" }
//! }
//!
//! let mut world = World::new(MemoryAdapter::new());
//! let plan = world.plan(&Ping, json!({})).unwrap();
//!
//! world.set_step_state(plan.id(), 2, StepState::Running).unwrap();
//! let plan = world.set_step_state(plan.id(), 2, StepState::Success).unwrap();
//! assert_eq!(plan.result(), PlanResult::Success);
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::action::{Action, ActionId, ActionRegistry, ActionTree};
use crate::definition::{build_tree, ActionDefinition};
use crate::error::Result;
use crate::persistence::{Persistence, PersistenceAdapter, PlanFilter, PlanPage};
use crate::plan::ExecutionPlan;
use crate::steps::{StepError, StepId, StepState};

/// Plans actions and keeps the plans persisted.
#[derive(Debug)]
pub struct World<A> {
    persistence: Persistence<A>,
    registry: ActionRegistry,
}

impl<A: PersistenceAdapter> World<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            persistence: Persistence::new(adapter),
            registry: ActionRegistry::new(),
        }
    }

    pub fn persistence(&self) -> &Persistence<A> {
        &self.persistence
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Make an action available to [`World::plan_named`].
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.registry.register(action);
    }

    /// Plan `action` with `input` and persist the plan.
    ///
    /// Nothing is persisted when planning fails.
    pub fn plan(&mut self, action: &dyn Action, input: Value) -> Result<ExecutionPlan> {
        self.plan_tree(&ActionTree::build(action, input))
    }

    /// Plan a registered action by name.
    pub fn plan_named(&mut self, name: &str, input: Value) -> Result<ExecutionPlan> {
        let action = self.registry.get(name)?;
        self.plan(action.as_ref(), input)
    }

    /// Plan a declarative definition.
    pub fn plan_definition(&mut self, definition: &ActionDefinition) -> Result<ExecutionPlan> {
        self.plan_tree(&build_tree(definition)?)
    }

    /// Plan an already materialized tree and persist the plan.
    pub fn plan_tree(&mut self, tree: &ActionTree) -> Result<ExecutionPlan> {
        let plan = ExecutionPlan::from_tree(tree)?;
        self.persistence.save(&plan)?;
        Ok(plan)
    }

    pub fn persisted_plan(&self, plan_id: &str) -> Result<ExecutionPlan> {
        self.persistence.load(plan_id)
    }

    pub fn persisted_plans(&self, filter: &PlanFilter) -> Result<PlanPage> {
        self.persistence.persisted_plans(filter)
    }

    /// Apply a state transition to a persisted step and save it.
    pub fn set_step_state(
        &mut self,
        plan_id: &str,
        step_id: StepId,
        state: StepState,
    ) -> Result<ExecutionPlan> {
        let mut plan = self.persistence.load(plan_id)?;
        plan.set_step_state(step_id, state)?;
        self.save_step(&plan, step_id)?;
        Ok(plan)
    }

    /// Fail a persisted running step.
    pub fn record_step_error(
        &mut self,
        plan_id: &str,
        step_id: StepId,
        error: StepError,
    ) -> Result<ExecutionPlan> {
        let mut plan = self.persistence.load(plan_id)?;
        plan.record_step_error(step_id, error)?;
        self.save_step(&plan, step_id)?;
        Ok(plan)
    }

    /// Reset a persisted failed step for another attempt.
    pub fn retry_step(&mut self, plan_id: &str, step_id: StepId) -> Result<ExecutionPlan> {
        let mut plan = self.persistence.load(plan_id)?;
        plan.retry_step(step_id)?;
        self.save_step(&plan, step_id)?;
        Ok(plan)
    }

    /// Skip every step of a persisted plan that has not started.
    pub fn cancel(&mut self, plan_id: &str) -> Result<(ExecutionPlan, Vec<StepId>)> {
        let mut plan = self.persistence.load(plan_id)?;
        let skipped = plan.skip_remaining()?;
        for step_id in &skipped {
            self.save_step(&plan, *step_id)?;
        }
        info!("Cancelled plan {}", plan_id);
        Ok((plan, skipped))
    }

    /// Store an action's output in a persisted plan.
    pub fn record_output(
        &mut self,
        plan_id: &str,
        action_id: ActionId,
        output: Value,
    ) -> Result<ExecutionPlan> {
        let mut plan = self.persistence.load(plan_id)?;
        plan.record_output(action_id, output)?;
        if let Some(action) = plan.action(action_id) {
            self.persistence.save_action(plan_id, action)?;
        }
        Ok(plan)
    }

    fn save_step(&mut self, plan: &ExecutionPlan, step_id: StepId) -> Result<()> {
        match plan.step(step_id) {
            Some(step) => self.persistence.save_step(plan.id(), step),
            None => Ok(()),
        }
    }
}
