//! Saving and restoring execution plans.
//!
//! [`Persistence`] writes a plan as separate records (the plan document,
//! one record per step, one per action) through a [`PersistenceAdapter`],
//! so the execution layer can save a single step after each transition.
//! Loading reassembles the records and refuses plans whose parts disagree.
//!
//! # Example
//!
//! ```
//! use planflow::action::Action;
//! use planflow::persistence::{MemoryAdapter, Persistence};
//! use planflow::plan::ExecutionPlan;
//! use serde_json::json;
//!
//! struct Ping;
//! impl Action for Ping {
//!     fn name(&self) -> &str { "Ping" }
//! }
//!
//! let plan = ExecutionPlan::plan(&Ping, json!({})).unwrap();
//! let mut persistence = Persistence::new(MemoryAdapter::new());
//! persistence.save(&plan).unwrap();
//!
//! let loaded = persistence.load(plan.id()).unwrap();
//! assert_eq!(loaded.run_flow(), plan.run_flow());
//! ```

mod adapter;
mod file;
mod memory;

use std::cmp::Reverse;

use serde_json::Value;
use tracing::{debug, warn};

use crate::action::{ActionId, ActionRecord};
use crate::error::{PlanError, Result};
use crate::plan::{ExecutionPlan, PlanRecord, PlanResult, SerializedPlan};
use crate::steps::Step;

pub use adapter::PersistenceAdapter;
pub use file::FileAdapter;
pub use memory::MemoryAdapter;

/// Query for [`Persistence::persisted_plans`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanFilter {
    /// Results to include; empty means all.
    pub results: Vec<PlanResult>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl Default for PlanFilter {
    fn default() -> Self {
        Self {
            results: PlanResult::ALL.to_vec(),
            page: 1,
            per_page: 10,
        }
    }
}

/// One page of persisted plans, newest first.
#[derive(Debug, Clone)]
pub struct PlanPage {
    pub plans: Vec<ExecutionPlan>,
    pub page: usize,
    pub per_page: usize,
    /// Number of matching plans across all pages.
    pub total: usize,
}

impl PlanPage {
    /// Number of pages needed for all matching plans.
    pub fn pages(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1))
    }
}

/// Plan storage on top of an adapter.
#[derive(Debug, Clone)]
pub struct Persistence<A> {
    adapter: A,
}

impl<A: PersistenceAdapter> Persistence<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Write the plan document, every step and every action.
    pub fn save(&mut self, plan: &ExecutionPlan) -> Result<()> {
        let record = serde_json::to_value(plan.record())?;
        self.adapter.save_execution_plan(plan.id(), &record)?;

        for step in plan.steps() {
            self.save_step(plan.id(), step)?;
        }
        for action in plan.actions() {
            self.save_action(plan.id(), action)?;
        }

        debug!("Saved plan {}", plan.id());
        Ok(())
    }

    /// Write one step after it changed.
    pub fn save_step(&mut self, plan_id: &str, step: &Step) -> Result<()> {
        let value = serde_json::to_value(step)?;
        self.adapter.save_step(plan_id, step.id, &value)
    }

    /// Write one action, e.g. after its output was recorded.
    pub fn save_action(&mut self, plan_id: &str, action: &ActionRecord) -> Result<()> {
        let value = serde_json::to_value(action)?;
        self.adapter.save_action(plan_id, action.id, &value)
    }

    /// Reassemble a plan from its records.
    pub fn load(&self, plan_id: &str) -> Result<ExecutionPlan> {
        let mismatch = |message: String| PlanError::DeserializationMismatch {
            plan_id: plan_id.to_string(),
            message,
        };

        let value = self
            .adapter
            .load_execution_plan(plan_id)?
            .ok_or_else(|| PlanError::PlanNotFound {
                plan_id: plan_id.to_string(),
            })?;
        let plan: PlanRecord = decode(value).map_err(|e| mismatch(e.to_string()))?;

        let mut steps = Vec::with_capacity(plan.step_ids.len());
        for step_id in &plan.step_ids {
            let value = self
                .adapter
                .load_step(plan_id, *step_id)?
                .ok_or_else(|| mismatch(format!("step {} is not stored", step_id)))?;
            steps.push(decode::<Step>(value).map_err(|e| mismatch(e.to_string()))?);
        }

        let mut actions = Vec::with_capacity(plan.action_ids.len());
        for action_id in &plan.action_ids {
            actions.push(self.load_action(plan_id, *action_id)?);
        }

        ExecutionPlan::deserialize(SerializedPlan {
            plan,
            steps,
            actions,
        })
    }

    /// Load a single action record.
    pub fn load_action(&self, plan_id: &str, action_id: ActionId) -> Result<ActionRecord> {
        let mismatch = |message: String| PlanError::DeserializationMismatch {
            plan_id: plan_id.to_string(),
            message,
        };

        let value = self
            .adapter
            .load_action(plan_id, action_id)?
            .ok_or_else(|| mismatch(format!("action {} is not stored", action_id)))?;
        decode(value).map_err(|e| mismatch(e.to_string()))
    }

    /// Stored plans matching `filter`, newest first, one page at a time.
    ///
    /// Results are recomputed from the loaded steps. Plans that fail to
    /// load are left out with a warning.
    pub fn persisted_plans(&self, filter: &PlanFilter) -> Result<PlanPage> {
        let mut matching = Vec::new();
        for plan_id in self.adapter.list_execution_plans()? {
            match self.load(&plan_id) {
                Ok(plan) => {
                    if filter.results.is_empty() || filter.results.contains(&plan.result()) {
                        matching.push(plan);
                    }
                }
                Err(e) => warn!("Skipping plan {}: {}", plan_id, e),
            }
        }

        matching.sort_by_key(|plan| (Reverse(plan.created_at()), plan.id().to_string()));

        let page = filter.page.max(1);
        let per_page = filter.per_page.max(1);
        let total = matching.len();
        let plans = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(PlanPage {
            plans,
            page,
            per_page,
            total,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}
