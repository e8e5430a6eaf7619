//! Planning definitions as actions.

use std::collections::HashMap;

use serde_json::Value;

use super::{ActionDefinition, GroupMode};
use crate::action::{Action, ActionId, ActionTree, PlanContext};
use crate::error::{PlanError, Result};

/// An action described by a definition file.
#[derive(Debug, Clone)]
pub struct DefinedAction<'d> {
    definition: &'d ActionDefinition,
}

impl<'d> DefinedAction<'d> {
    pub fn new(definition: &'d ActionDefinition) -> Self {
        Self { definition }
    }

    fn plan_children(&self, ctx: &mut PlanContext<'_>) {
        for child in &self.definition.actions {
            ctx.plan_action(&DefinedAction::new(child), child.input.clone());
        }
    }
}

impl Action for DefinedAction<'_> {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
        match self.definition.mode {
            Some(GroupMode::Sequence) => ctx.sequence(|ctx| self.plan_children(ctx)),
            Some(GroupMode::Concurrence) => ctx.concurrence(|ctx| self.plan_children(ctx)),
            None => self.plan_children(ctx),
        }

        if self.has_run() || self.has_finalize() {
            ctx.plan_self(input)?;
        }
        Ok(())
    }

    fn has_run(&self) -> bool {
        self.definition.has_run()
    }

    fn has_finalize(&self) -> bool {
        self.definition.finalize
    }
}

/// Materialize the action tree of a definition.
///
/// Dependencies are declared by name and may point at actions declared
/// later, so they are attached once every action has its id.
pub fn build_tree(definition: &ActionDefinition) -> Result<ActionTree> {
    let mut tree = ActionTree::build(&DefinedAction::new(definition), definition.input.clone());

    let ids: HashMap<String, ActionId> = tree
        .nodes()
        .iter()
        .map(|node| (node.name.clone(), node.id))
        .collect();
    let lookup = |name: &String| {
        ids.get(name).copied().ok_or_else(|| PlanError::UnknownAction {
            name: name.clone(),
        })
    };

    for action in definition.walk() {
        let id = lookup(&action.name)?;
        let depends_on = action.depends_on.iter().map(lookup).collect::<Result<Vec<_>>>()?;
        let finalize_depends_on = action
            .finalize_depends_on
            .iter()
            .map(lookup)
            .collect::<Result<Vec<_>>>()?;

        let Some(node) = tree.node_mut(id) else {
            continue;
        };
        for dep in depends_on {
            if dep != id && !node.depends_on.contains(&dep) {
                node.depends_on.push(dep);
            }
        }
        for dep in finalize_depends_on {
            if dep != id && !node.finalize_depends_on.contains(&dep) {
                node.finalize_depends_on.push(dep);
            }
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_definition;
    use crate::flow::Flow;
    use crate::planner::Planner;

    fn plan(yaml: &str) -> (ActionTree, Flow, Flow) {
        let definition = parse_definition(yaml).unwrap();
        let tree = build_tree(&definition).unwrap();
        let flows = Planner::plan(&tree).unwrap();
        (tree, flows.run_flow, flows.finalize_flow)
    }

    #[test]
    fn commit_definition_joins_reviews_before_merge() {
        let (_, run_flow, _) = plan(
            r#"
name: commit
actions:
  - name: ci
  - name: review_morfeus
  - name: review_neo
  - name: merge
    depends_on: [ci, review_morfeus, review_neo]
"#,
        );

        // commit plan 1; ci 2/3; reviews 4/5 and 6/7; merge 8/9
        assert_eq!(
            run_flow,
            Flow::Sequence(vec![
                Flow::Concurrence(vec![Flow::Atom(3), Flow::Atom(5), Flow::Atom(7)]),
                Flow::Atom(9),
            ])
        );
    }

    #[test]
    fn forward_dependencies_are_resolved() {
        let (tree, run_flow, _) = plan(
            r#"
name: deploy
actions:
  - name: migrate
    depends_on: [build]
  - name: build
"#,
        );

        assert_eq!(tree.node(2).unwrap().depends_on, vec![3]);
        assert_eq!(run_flow, Flow::Sequence(vec![Flow::Atom(5), Flow::Atom(3)]));
    }

    #[test]
    fn sequence_mode_orders_without_dependencies() {
        let (_, run_flow, _) = plan(
            r#"
name: fast_commit
mode: sequence
actions:
  - name: checks
    mode: concurrence
    actions:
      - name: ci
      - name: review
  - name: merge
"#,
        );

        // fast_commit 1; checks 2; ci 3/4; review 5/6; merge 7/8
        assert_eq!(
            run_flow,
            Flow::Sequence(vec![
                Flow::Concurrence(vec![Flow::Atom(4), Flow::Atom(6)]),
                Flow::Atom(8),
            ])
        );
    }

    #[test]
    fn finalize_steps_are_linearized_with_root_last() {
        let (_, _, finalize_flow) = plan(
            r#"
name: release
finalize: true
actions:
  - name: tag
    finalize: true
    finalize_depends_on: [notes]
  - name: notes
    finalize: true
"#,
        );

        // release 1; tag 2/3/4; notes 5/6/7; release finalize 8
        assert_eq!(
            finalize_flow,
            Flow::Sequence(vec![Flow::Atom(7), Flow::Atom(4), Flow::Atom(8)])
        );
    }

    #[test]
    fn dependency_cycles_fail_planning() {
        let definition = parse_definition(
            r#"
name: loop
actions:
  - name: a
    depends_on: [b]
  - name: b
    depends_on: [a]
"#,
        )
        .unwrap();
        let tree = build_tree(&definition).unwrap();

        let err = Planner::plan(&tree).unwrap_err();
        assert!(matches!(err, PlanError::CyclicDependency { cycle } if cycle == "a#2 -> b#3 -> a#2"));
    }
}
