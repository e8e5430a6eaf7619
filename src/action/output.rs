//! References to other actions' outputs embedded in inputs.
//!
//! An [`OutputRef`] is stored inside an input value as
//! `{"@output": {"action_id": 4, "path": ["assignee"]}}`. The planner scans
//! inputs for these markers to find data dependencies, and the execution
//! layer substitutes them with recorded outputs before running a step.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::ActionId;

const MARKER: &str = "@output";

/// Reference to (part of) another action's output.
///
/// Serializes as the `@output` marker, so `json!` and `serde_json::to_value`
/// embed it the same way `Value::from` does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRef {
    pub action_id: ActionId,
    pub path: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct MarkerBody {
    action_id: ActionId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    path: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Marker {
    #[serde(rename = "@output")]
    body: MarkerBody,
}

impl Serialize for OutputRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        Marker {
            body: MarkerBody {
                action_id: self.action_id,
                path: self.path.clone(),
            },
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let Marker { body } = Marker::deserialize(deserializer)?;
        Ok(Self {
            action_id: body.action_id,
            path: body.path,
        })
    }
}

impl OutputRef {
    /// Reference the whole output of an action.
    pub fn new(action_id: ActionId) -> Self {
        Self {
            action_id,
            path: Vec::new(),
        }
    }

    /// Narrow the reference to a field of the output.
    pub fn field(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }

    /// Decode a marker value, if `value` is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 || !object.contains_key(MARKER) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Pick the referenced part out of a recorded output.
    fn select<'a>(&self, output: &'a Value) -> Option<&'a Value> {
        self.path
            .iter()
            .try_fold(output, |current, key| match current {
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => current.get(key),
            })
    }
}

impl From<OutputRef> for Value {
    fn from(reference: OutputRef) -> Self {
        let mut body = serde_json::Map::new();
        body.insert("action_id".to_string(), Value::from(reference.action_id));
        if !reference.path.is_empty() {
            body.insert("path".to_string(), Value::from(reference.path));
        }

        let mut object = serde_json::Map::new();
        object.insert(MARKER.to_string(), Value::Object(body));
        Value::Object(object)
    }
}

/// All output references inside `value`, in document order.
pub fn collect_output_refs(value: &Value) -> Vec<OutputRef> {
    let mut found = Vec::new();
    collect_into(value, &mut found);
    found
}

fn collect_into(value: &Value, found: &mut Vec<OutputRef>) {
    if let Some(reference) = OutputRef::from_value(value) {
        found.push(reference);
        return;
    }

    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_into(item, found)),
        Value::Object(object) => object.values().for_each(|item| collect_into(item, found)),
        _ => {}
    }
}

/// Replace every output reference with the referenced value.
///
/// References to outputs that were not recorded yet resolve to `null`.
pub fn resolve_output_refs<F>(value: &Value, output_of: &F) -> Value
where
    F: Fn(ActionId) -> Option<Value>,
{
    if let Some(reference) = OutputRef::from_value(value) {
        return output_of(reference.action_id)
            .and_then(|output| reference.select(&output).cloned())
            .unwrap_or(Value::Null);
    }

    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_output_refs(item, output_of))
                .collect(),
        ),
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, item)| (key.clone(), resolve_output_refs(item, output_of)))
                .collect(),
        ),
        other => other.clone(),
    }
}
