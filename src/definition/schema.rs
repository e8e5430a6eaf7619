//! Schema of workflow definition files.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the sub-actions of a definition are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Run sub-actions one after another, in declaration order.
    Sequence,
    /// Run sub-actions in parallel unless they depend on each other.
    Concurrence,
}

/// One action of a workflow definition; the file itself is the root action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ActionDefinition {
    /// Name, unique within the workflow.
    pub name: String,

    /// Input passed to the action.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub input: Value,

    /// Whether the action has a run step.
    ///
    /// Defaults to true for actions without sub-actions and false otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<bool>,

    /// Whether the action has a finalize step.
    #[serde(default, skip_serializing_if = "is_false")]
    pub finalize: bool,

    /// Explicit grouping of the sub-actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<GroupMode>,

    /// Names of actions whose run steps must finish first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Names of actions whose finalize steps must finish first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalize_depends_on: Vec<String>,

    /// Sub-actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDefinition>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: Value::Null,
            run: None,
            finalize: false,
            mode: None,
            depends_on: Vec::new(),
            finalize_depends_on: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn has_run(&self) -> bool {
        self.run.unwrap_or(self.actions.is_empty())
    }

    /// This definition and all nested ones, parents first.
    pub fn walk(&self) -> Vec<&ActionDefinition> {
        let mut all = vec![self];
        for child in &self.actions {
            all.extend(child.walk());
        }
        all
    }
}

/// JSON schema of definition files.
pub fn definition_schema() -> schemars::Schema {
    schemars::schema_for!(ActionDefinition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_run_by_default() {
        let mut parent = ActionDefinition::new("commit");
        assert!(parent.has_run());

        parent.actions.push(ActionDefinition::new("ci"));
        assert!(!parent.has_run());
        assert!(parent.actions[0].has_run());

        parent.run = Some(true);
        assert!(parent.has_run());
    }

    #[test]
    fn walk_lists_parents_first() {
        let mut root = ActionDefinition::new("root");
        let mut issue = ActionDefinition::new("issue");
        issue.actions.push(ActionDefinition::new("triage"));
        root.actions.push(issue);
        root.actions.push(ActionDefinition::new("report"));

        let names: Vec<_> = root.walk().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["root", "issue", "triage", "report"]);
    }

    #[test]
    fn schema_names_the_fields() {
        let schema = serde_json::to_value(definition_schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("depends_on").is_some());
        assert!(properties.get("mode").is_some());
    }
}
