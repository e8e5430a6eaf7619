//! The storage contract.

use serde_json::Value;

use crate::action::ActionId;
use crate::error::Result;
use crate::steps::StepId;

/// Key-value storage for plans, partitioned by plan id.
///
/// Payloads are opaque JSON documents. Loads return `Ok(None)` when
/// nothing is stored under the key.
///
/// Callers must not run two mutations for the same plan id at once; the
/// adapter is not expected to lock.
pub trait PersistenceAdapter {
    fn save_execution_plan(&mut self, plan_id: &str, plan: &Value) -> Result<()>;

    fn load_execution_plan(&self, plan_id: &str) -> Result<Option<Value>>;

    /// Ids of all stored plans, in no particular order.
    fn list_execution_plans(&self) -> Result<Vec<String>>;

    fn save_step(&mut self, plan_id: &str, step_id: StepId, step: &Value) -> Result<()>;

    fn load_step(&self, plan_id: &str, step_id: StepId) -> Result<Option<Value>>;

    fn save_action(&mut self, plan_id: &str, action_id: ActionId, action: &Value) -> Result<()>;

    fn load_action(&self, plan_id: &str, action_id: ActionId) -> Result<Option<Value>>;
}
