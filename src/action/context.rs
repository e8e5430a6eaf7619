//! The context handed to planning callbacks.

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::output::collect_output_refs;
use super::tree::{ActionNode, GroupKind, PlanItem};
use super::{Action, ActionId, ActionRef, OutputRef};
use crate::steps::{StepError, StepId};

/// Sequential allocator for action and step ids.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    last_action: ActionId,
    last_step: StepId,
}

impl IdAllocator {
    fn next_action(&mut self) -> ActionId {
        self.last_action += 1;
        self.last_action
    }

    fn next_step(&mut self) -> StepId {
        self.last_step += 1;
        self.last_step
    }

    pub(crate) fn step_count(&self) -> StepId {
        self.last_step
    }
}

/// Recorder for what one action declares while planning.
pub struct PlanContext<'a> {
    ids: &'a mut IdAllocator,
    node: ActionNode,
    has_run: bool,
    has_finalize: bool,
    planned_self: bool,
    /// Explicit groups currently open, innermost last.
    groups: Vec<(GroupKind, Vec<PlanItem>)>,
}

impl<'a> PlanContext<'a> {
    pub(crate) fn plan_root(ids: &mut IdAllocator, action: &dyn Action, input: Value) -> ActionNode {
        PlanContext::plan_node(ids, action, input)
    }

    fn plan_node(ids: &mut IdAllocator, action: &dyn Action, input: Value) -> ActionNode {
        let id = ids.next_action();
        let plan_step = ids.next_step();
        debug!("Planning action {}#{}", action.name(), id);

        let mut ctx = PlanContext {
            node: ActionNode::new(id, action.name(), input.clone(), plan_step),
            ids,
            has_run: action.has_run(),
            has_finalize: action.has_finalize(),
            planned_self: false,
            groups: Vec::new(),
        };

        if let Err(err) = action.plan(&mut ctx, input) {
            debug!("Planning of {}#{} failed: {:#}", action.name(), id, err);
            ctx.node.plan_error = Some(StepError::from_anyhow(&err));
        }

        ctx.finish()
    }

    fn finish(mut self) -> ActionNode {
        // Groups left open by an early return still count.
        while let Some((kind, items)) = self.groups.pop() {
            self.push_item(PlanItem::Group(kind, items));
        }

        for reference in collect_output_refs(&self.node.input) {
            if !self.node.depends_on.contains(&reference.action_id) {
                self.node.depends_on.push(reference.action_id);
            }
        }
        self.node.plan_ended_at = Some(Utc::now());
        self.node
    }

    fn push_item(&mut self, item: PlanItem) {
        match self.groups.last_mut() {
            Some((_, items)) => items.push(item),
            None => self.node.items.push(item),
        }
    }

    /// Id of the action being planned.
    pub fn action_id(&self) -> ActionId {
        self.node.id
    }

    /// Reference to the output of the action being planned.
    pub fn output(&self) -> OutputRef {
        OutputRef::new(self.node.id)
    }

    /// Register this action's own run and finalize steps.
    ///
    /// `input` becomes the action's stored input. Output references inside
    /// it turn into run dependencies.
    pub fn plan_self(&mut self, input: Value) -> anyhow::Result<()> {
        if self.planned_self {
            anyhow::bail!(
                "{}#{} registered its own steps twice",
                self.node.name,
                self.node.id
            );
        }
        self.planned_self = true;
        self.node.input = input;

        if self.has_run {
            self.node.run_step = Some(self.ids.next_step());
        }
        if self.has_finalize {
            self.node.finalize_step = Some(self.ids.next_step());
        }
        self.push_item(PlanItem::Own);
        Ok(())
    }

    /// Plan a sub-action and return a handle to it.
    pub fn plan_action(&mut self, action: &dyn Action, input: Value) -> ActionRef {
        let child = PlanContext::plan_node(self.ids, action, input);
        let handle = ActionRef { id: child.id };
        self.push_item(PlanItem::Action(child));
        handle
    }

    /// Plan everything declared in `body` strictly one after another.
    pub fn sequence<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.group(GroupKind::Sequence, body)
    }

    /// Plan everything declared in `body` to run in parallel.
    pub fn concurrence<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.group(GroupKind::Concurrence, body)
    }

    fn group<R>(&mut self, kind: GroupKind, body: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.groups.len();
        self.groups.push((kind, Vec::new()));
        let result = body(self);

        // Close anything the body left open along with this group.
        while self.groups.len() > depth {
            if let Some((kind, items)) = self.groups.pop() {
                self.push_item(PlanItem::Group(kind, items));
            }
        }
        result
    }

    /// Make this action's run step wait for `action`'s run steps.
    pub fn depends_on(&mut self, action: &ActionRef) {
        if action.id != self.node.id && !self.node.depends_on.contains(&action.id) {
            self.node.depends_on.push(action.id);
        }
    }

    /// Make this action's finalize step wait for `action`'s finalize step.
    pub fn finalize_depends_on(&mut self, action: &ActionRef) {
        if action.id != self.node.id && !self.node.finalize_depends_on.contains(&action.id) {
            self.node.finalize_depends_on.push(action.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTree;
    use serde_json::json;

    struct Leaf(&'static str);

    impl Action for Leaf {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct Cleanup;

    impl Action for Cleanup {
        fn name(&self) -> &str {
            "Cleanup"
        }

        fn has_run(&self) -> bool {
            false
        }

        fn has_finalize(&self) -> bool {
            true
        }
    }

    struct Parent;

    impl Action for Parent {
        fn name(&self) -> &str {
            "Parent"
        }

        fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
            let build = ctx.plan_action(&Leaf("Build"), input.clone());
            ctx.concurrence(|ctx| {
                ctx.plan_action(&Leaf("Lint"), json!({ "build": build.output() }));
                ctx.plan_action(&Cleanup, Value::Null);
            });
            ctx.plan_self(input)
        }
    }

    struct Broken;

    impl Action for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
            ctx.plan_self(input.clone())?;
            ctx.plan_self(input)
        }
    }

    #[test]
    fn ids_follow_planning_order() {
        let tree = ActionTree::build(&Parent, json!({}));
        let ids: Vec<_> = tree
            .nodes()
            .iter()
            .map(|n| (n.name.as_str(), n.plan_step, n.run_step, n.finalize_step))
            .collect();

        assert_eq!(
            ids,
            vec![
                ("Parent", 1, Some(8), None),
                ("Build", 2, Some(3), None),
                ("Lint", 4, Some(5), None),
                ("Cleanup", 6, None, Some(7)),
            ]
        );
    }

    #[test]
    fn input_references_become_dependencies() {
        let tree = ActionTree::build(&Parent, json!({}));
        let lint = tree.node(3).unwrap();
        assert_eq!(lint.name, "Lint");
        assert_eq!(lint.depends_on, vec![2]);
    }

    #[test]
    fn groups_are_recorded_in_place() {
        let tree = ActionTree::build(&Parent, json!({}));
        let items = &tree.root().items;

        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], PlanItem::Action(_)));
        assert!(matches!(&items[1], PlanItem::Group(GroupKind::Concurrence, inner) if inner.len() == 2));
        assert!(matches!(items[2], PlanItem::Own));
    }

    #[test]
    fn explicit_dependencies_skip_self_and_duplicates() {
        struct Deploy;

        impl Action for Deploy {
            fn name(&self) -> &str {
                "Deploy"
            }

            fn plan(&self, ctx: &mut PlanContext<'_>, input: Value) -> anyhow::Result<()> {
                let build = ctx.plan_action(&Leaf("Build"), Value::Null);
                let own = ActionRef {
                    id: ctx.action_id(),
                };
                ctx.depends_on(&build);
                ctx.depends_on(&build);
                ctx.depends_on(&own);
                ctx.finalize_depends_on(&build);
                ctx.plan_self(input)
            }
        }

        let tree = ActionTree::build(&Deploy, json!({}));
        assert_eq!(tree.root().depends_on, vec![2]);
        assert_eq!(tree.root().finalize_depends_on, vec![2]);
    }

    #[test]
    fn finalize_only_action_gets_one_step() {
        let tree = ActionTree::build(&Cleanup, Value::Null);
        assert_eq!(tree.root().run_step, None);
        assert_eq!(tree.root().finalize_step, Some(2));
    }

    #[test]
    fn failing_callback_is_recorded_not_raised() {
        let tree = ActionTree::build(&Broken, json!({}));
        let root = tree.root();

        assert!(root.plan_error.is_some());
        assert!(root.plan_ended_at.is_some());
        assert_eq!(root.run_step, Some(2));
    }
}
