//! Sequential gating queries.
//!
//! A step inside a sequence may only start once everything before it in
//! that sequence finished with `success` or `skipped`. Concurrence children
//! impose no order on each other.

use super::Flow;
use crate::steps::{StepId, StepState};

impl Flow {
    /// Whether every step of this flow passes the gate.
    pub fn is_finished<F>(&self, state_of: &F) -> bool
    where
        F: Fn(StepId) -> StepState,
    {
        match self {
            Flow::Atom(id) => state_of(*id).passes_gate(),
            Flow::Sequence(children) | Flow::Concurrence(children) => {
                children.iter().all(|child| child.is_finished(state_of))
            }
        }
    }

    /// Whether all predecessors of `step_id` have passed the gate.
    ///
    /// Returns `None` when the step is not part of this flow.
    pub fn predecessors_finished<F>(&self, step_id: StepId, state_of: &F) -> Option<bool>
    where
        F: Fn(StepId) -> StepState,
    {
        match self {
            Flow::Atom(id) => (*id == step_id).then_some(true),
            Flow::Concurrence(children) => children
                .iter()
                .find_map(|child| child.predecessors_finished(step_id, state_of)),
            Flow::Sequence(children) => {
                let mut before_done = true;
                for child in children {
                    if let Some(inner_done) = child.predecessors_finished(step_id, state_of) {
                        return Some(before_done && inner_done);
                    }
                    before_done = before_done && child.is_finished(state_of);
                }
                None
            }
        }
    }

    /// Pending steps that may start now.
    pub fn ready_step_ids<F>(&self, state_of: &F) -> Vec<StepId>
    where
        F: Fn(StepId) -> StepState,
    {
        let mut ready = Vec::new();
        self.collect_ready(state_of, &mut ready);
        ready
    }

    fn collect_ready<F>(&self, state_of: &F, ready: &mut Vec<StepId>)
    where
        F: Fn(StepId) -> StepState,
    {
        match self {
            Flow::Atom(id) => {
                if state_of(*id) == StepState::Pending {
                    ready.push(*id);
                }
            }
            Flow::Concurrence(children) => {
                for child in children {
                    child.collect_ready(state_of, ready);
                }
            }
            Flow::Sequence(children) => {
                for child in children {
                    child.collect_ready(state_of, ready);
                    if !child.is_finished(state_of) {
                        break;
                    }
                }
            }
        }
    }
}
