//! Execution-order trees over step ids.
//!
//! A [`Flow`] is an immutable value describing in which order steps run:
//!
//! - [`Flow::Atom`] - a single step, referenced by id
//! - [`Flow::Sequence`] - children run strictly one after another
//! - [`Flow::Concurrence`] - children may run in parallel
//!
//! Flows never hold steps themselves, only their ids; the owning plan keeps
//! the steps in an id-keyed map. Two concurrences are equal when they hold
//! the same children in any order, but children are always stored and
//! serialized in insertion order so a persisted flow reads back unchanged.
//!
//! # Example
//!
//! ```
//! use planflow::flow::Flow;
//!
//! let a = Flow::sequence(vec![
//!     Flow::concurrence(vec![Flow::Atom(3), Flow::Atom(5)]),
//!     Flow::Atom(7),
//! ]);
//! let b = Flow::sequence(vec![
//!     Flow::concurrence(vec![Flow::Atom(5), Flow::Atom(3)]),
//!     Flow::Atom(7),
//! ]);
//!
//! assert_eq!(a, b);
//! assert_eq!(a.all_step_ids(), vec![3, 5, 7]);
//! ```

mod readiness;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlanError, Result};
use crate::steps::StepId;

/// Execution order over step ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "serde_json::Value")]
pub enum Flow {
    Atom(StepId),
    Sequence(Vec<Flow>),
    Concurrence(Vec<Flow>),
}

impl Flow {
    /// Build a normalized sequence.
    ///
    /// Empty children are dropped, nested sequences are spliced in and a
    /// single remaining child is returned unwrapped.
    pub fn sequence(children: Vec<Flow>) -> Flow {
        Self::compose(children, true)
    }

    /// Build a normalized concurrence (same rules as [`Flow::sequence`]).
    pub fn concurrence(children: Vec<Flow>) -> Flow {
        Self::compose(children, false)
    }

    fn compose(children: Vec<Flow>, sequential: bool) -> Flow {
        let mut flat = Vec::with_capacity(children.len());

        for child in children {
            match child.normalize() {
                empty if empty.is_empty() => {}
                Flow::Sequence(inner) if sequential => flat.extend(inner),
                Flow::Concurrence(inner) if !sequential => flat.extend(inner),
                other => flat.push(other),
            }
        }

        match (flat.len(), sequential) {
            (1, _) => flat.remove(0),
            (_, true) => Flow::Sequence(flat),
            (_, false) => Flow::Concurrence(flat),
        }
    }

    /// Normalize this flow recursively (see [`Flow::sequence`]).
    pub fn normalize(self) -> Flow {
        match self {
            Flow::Atom(_) => self,
            Flow::Sequence(children) => Self::compose(children, true),
            Flow::Concurrence(children) => Self::compose(children, false),
        }
    }

    /// Whether the flow references no step at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Flow::Atom(_) => false,
            Flow::Sequence(children) | Flow::Concurrence(children) => {
                children.iter().all(Flow::is_empty)
            }
        }
    }

    /// Depth-first enumeration of the referenced step ids.
    ///
    /// Children are visited in their stored order for both sequences and
    /// concurrences, so the result is stable across a persistence round-trip.
    pub fn all_step_ids(&self) -> Vec<StepId> {
        let mut ids = Vec::new();
        self.each_atom_id(&mut |id| ids.push(id));
        ids
    }

    /// Visit every atom id depth-first.
    pub fn each_atom_id(&self, visit: &mut impl FnMut(StepId)) {
        match self {
            Flow::Atom(id) => visit(*id),
            Flow::Sequence(children) | Flow::Concurrence(children) => {
                for child in children {
                    child.each_atom_id(visit);
                }
            }
        }
    }

    /// Whether `step_id` appears anywhere in this flow.
    pub fn contains(&self, step_id: StepId) -> bool {
        match self {
            Flow::Atom(id) => *id == step_id,
            Flow::Sequence(children) | Flow::Concurrence(children) => {
                children.iter().any(|child| child.contains(step_id))
            }
        }
    }

    /// Tag of this node as used in the serialized form.
    pub fn variant(&self) -> &'static str {
        match self {
            Flow::Atom(_) => "atom",
            Flow::Sequence(_) => "sequence",
            Flow::Concurrence(_) => "concurrence",
        }
    }

    /// Decode a flow from its tagged JSON form.
    ///
    /// Any tag other than `atom`, `sequence` or `concurrence` is reported
    /// as [`PlanError::UnknownFlowVariant`].
    pub fn from_value(value: &Value) -> Result<Flow> {
        let unknown = |variant: String| PlanError::UnknownFlowVariant { variant };

        let object = value
            .as_object()
            .filter(|object| object.len() == 1)
            .ok_or_else(|| unknown(value.to_string()))?;
        let Some((tag, body)) = object.iter().next() else {
            return Err(unknown(value.to_string()));
        };

        match tag.as_str() {
            "atom" => body
                .as_u64()
                .map(Flow::Atom)
                .ok_or_else(|| unknown(format!("atom({})", body))),
            "sequence" | "concurrence" => {
                let children = body
                    .as_array()
                    .ok_or_else(|| unknown(format!("{}({})", tag, body)))?
                    .iter()
                    .map(Flow::from_value)
                    .collect::<Result<Vec<_>>>()?;

                Ok(if tag == "sequence" {
                    Flow::Sequence(children)
                } else {
                    Flow::Concurrence(children)
                })
            }
            other => Err(unknown(other.to_string())),
        }
    }

    /// Encode the flow in its tagged JSON form.
    pub fn to_value(&self) -> Value {
        match self {
            Flow::Atom(id) => serde_json::json!({ "atom": id }),
            Flow::Sequence(children) => {
                serde_json::json!({ "sequence": children.iter().map(Flow::to_value).collect::<Vec<_>>() })
            }
            Flow::Concurrence(children) => {
                serde_json::json!({ "concurrence": children.iter().map(Flow::to_value).collect::<Vec<_>>() })
            }
        }
    }
}

impl TryFrom<Value> for Flow {
    type Error = PlanError;

    fn try_from(value: Value) -> Result<Self> {
        Flow::from_value(&value)
    }
}

impl PartialEq for Flow {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Flow::Atom(a), Flow::Atom(b)) => a == b,
            (Flow::Sequence(a), Flow::Sequence(b)) => a == b,
            (Flow::Concurrence(a), Flow::Concurrence(b)) => same_multiset(a, b),
            _ => false,
        }
    }
}

impl Eq for Flow {}

impl Hash for Flow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variant().hash(state);
        match self {
            Flow::Atom(id) => id.hash(state),
            Flow::Sequence(children) => children.hash(state),
            Flow::Concurrence(children) => {
                // Order-insensitive: combine the sorted child digests.
                let mut digests: Vec<u64> = children
                    .iter()
                    .map(|child| {
                        let mut hasher = DefaultHasher::new();
                        child.hash(&mut hasher);
                        hasher.finish()
                    })
                    .collect();
                digests.sort_unstable();
                digests.hash(state);
            }
        }
    }
}

fn same_multiset(a: &[Flow], b: &[Flow]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut matched = vec![false; b.len()];
    a.iter().all(|child| {
        let found = b
            .iter()
            .enumerate()
            .position(|(i, candidate)| !matched[i] && candidate == child);
        match found {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}
