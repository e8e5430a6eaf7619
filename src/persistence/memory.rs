//! In-memory storage, for tests and embedding.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use super::PersistenceAdapter;
use crate::action::ActionId;
use crate::error::Result;
use crate::steps::StepId;

/// Keeps everything in maps; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryAdapter {
    plans: BTreeMap<String, Value>,
    steps: HashMap<(String, StepId), Value>,
    actions: HashMap<(String, ActionId), Value>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a stored step, e.g. to simulate a lost write.
    pub fn remove_step(&mut self, plan_id: &str, step_id: StepId) -> Option<Value> {
        self.steps.remove(&(plan_id.to_string(), step_id))
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn save_execution_plan(&mut self, plan_id: &str, plan: &Value) -> Result<()> {
        self.plans.insert(plan_id.to_string(), plan.clone());
        Ok(())
    }

    fn load_execution_plan(&self, plan_id: &str) -> Result<Option<Value>> {
        Ok(self.plans.get(plan_id).cloned())
    }

    fn list_execution_plans(&self) -> Result<Vec<String>> {
        Ok(self.plans.keys().cloned().collect())
    }

    fn save_step(&mut self, plan_id: &str, step_id: StepId, step: &Value) -> Result<()> {
        self.steps
            .insert((plan_id.to_string(), step_id), step.clone());
        Ok(())
    }

    fn load_step(&self, plan_id: &str, step_id: StepId) -> Result<Option<Value>> {
        Ok(self.steps.get(&(plan_id.to_string(), step_id)).cloned())
    }

    fn save_action(&mut self, plan_id: &str, action_id: ActionId, action: &Value) -> Result<()> {
        self.actions
            .insert((plan_id.to_string(), action_id), action.clone());
        Ok(())
    }

    fn load_action(&self, plan_id: &str, action_id: ActionId) -> Result<Option<Value>> {
        Ok(self.actions.get(&(plan_id.to_string(), action_id)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_by_plan_partition() {
        let mut adapter = MemoryAdapter::new();
        adapter.save_step("a", 1, &json!({"state": "pending"})).unwrap();
        adapter.save_step("b", 1, &json!({"state": "success"})).unwrap();

        assert_eq!(
            adapter.load_step("a", 1).unwrap(),
            Some(json!({"state": "pending"}))
        );
        assert_eq!(adapter.load_step("c", 1).unwrap(), None);
    }

    #[test]
    fn lists_saved_plans() {
        let mut adapter = MemoryAdapter::new();
        adapter.save_execution_plan("b", &json!({})).unwrap();
        adapter.save_execution_plan("a", &json!({})).unwrap();

        assert_eq!(adapter.list_execution_plans().unwrap(), vec!["a", "b"]);
    }
}
