//! Actions and their planning callbacks.
//!
//! An [`Action`] is a unit of user logic. When planned it receives a
//! [`PlanContext`] through which it registers its own run/finalize steps,
//! spawns sub-actions, opens explicit sequence/concurrence groups and
//! declares dependencies. Everything declared is recorded into an
//! [`ActionTree`]; the planner then turns the tree into flows.
//!
//! # Example
//!
//! ```
//! use planflow::action::{Action, ActionTree, PlanContext};
//! use serde_json::{json, Value};
//!
//! struct Ci;
//! impl Action for Ci {
//!     fn name(&self) -> &str { "Ci" }
//! }
//!
//! struct Commit;
//! impl Action for Commit {
//!     fn name(&self) -> &str { "Commit" }
//!     fn has_run(&self) -> bool { false }
//!
//!     fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
//!         ctx.plan_action(&Ci, json!({ "commit": input }));
//!         Ok(())
//!     }
//! }
//!
//! let tree = ActionTree::build(&Commit, json!({ "sha": "abc123" }));
//! assert_eq!(tree.nodes().len(), 2);
//! assert_eq!(tree.root().children()[0].run_step, Some(3));
//! ```

mod context;
mod output;
mod registry;
mod tree;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use context::PlanContext;
pub use output::{collect_output_refs, resolve_output_refs, OutputRef};
pub use registry::ActionRegistry;
pub use tree::{ActionNode, ActionTree, GroupKind, PlanItem};

/// Identifier of an action, unique within one plan.
pub type ActionId = u64;

/// User logic that can be planned into an execution plan.
pub trait Action {
    /// Name shown in rendered flows and stored with the plan.
    fn name(&self) -> &str;

    /// Planning callback.
    ///
    /// The default registers the action's own steps with the given input.
    fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
        ctx.plan_self(input)
    }

    /// Whether [`PlanContext::plan_self`] creates a run step.
    fn has_run(&self) -> bool {
        true
    }

    /// Whether [`PlanContext::plan_self`] creates a finalize step.
    fn has_finalize(&self) -> bool {
        false
    }
}

/// Handle to an action spawned during planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub id: ActionId,
}

impl ActionRef {
    /// Reference to this action's whole output, for embedding in inputs.
    pub fn output(&self) -> OutputRef {
        OutputRef::new(self.id)
    }
}

/// Persisted form of an action: identity, input and recorded output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: ActionId,
    pub name: String,
    pub input: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ActionRecord {
    pub fn from_node(node: &ActionNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            input: node.input.clone(),
            output: None,
        }
    }
}
