//! Declarative workflow definitions.
//!
//! A definition file describes an action tree in YAML:
//!
//! ```yaml
//! name: commit
//! input: { sha: abc123 }
//! actions:
//!   - name: ci
//!   - name: review
//!     input: { reviewer: Neo }
//!   - name: merge
//!     depends_on: [ci, review]
//!     finalize: true
//! ```
//!
//! Actions without sub-actions get a run step unless `run: false` is set.
//! `mode: sequence` or `mode: concurrence` groups an action's sub-actions
//! explicitly.

mod action;
mod loader;
mod schema;

pub use action::{build_tree, DefinedAction};
pub use loader::{load_definition, parse_definition, validate};
pub use schema::{definition_schema, ActionDefinition, GroupMode};
