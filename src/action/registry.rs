//! Lookup of actions by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Action;
use crate::error::{PlanError, Result};

/// Actions available for planning by name.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under its own name, replacing an earlier one.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Action>> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| PlanError::UnknownAction {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Action for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn lookup_by_name() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Named("Ci")));
        registry.register(Arc::new(Named("Merge")));

        assert_eq!(registry.names(), vec!["Ci", "Merge"]);
        assert_eq!(registry.get("Ci").unwrap().name(), "Ci");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = ActionRegistry::new();
        assert!(matches!(
            registry.get("Deploy"),
            Err(PlanError::UnknownAction { name }) if name == "Deploy"
        ));
    }
}
