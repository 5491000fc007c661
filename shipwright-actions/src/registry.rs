use std::sync::Arc;

use crate::action::Action;

/// Registry of workflow steps
///
/// Provides a central place to register and look up steps by id.
/// Used by the executor to resolve the step behind an invocation.
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Registers a step
    ///
    /// # Panics
    /// Panics if a step with the same id is already registered
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.register_shared(Arc::new(action));
    }

    /// Registers a step that is shared with other owners
    ///
    /// # Panics
    /// Panics if a step with the same id is already registered
    pub fn register_shared(&mut self, action: Arc<dyn Action>) {
        let id = action.id();
        if self.contains(id) {
            panic!("Action with id '{}' is already registered", id);
        }
        self.actions.push(action);
    }

    /// Gets a step by its id
    pub fn get(&self, id: &str) -> Option<&dyn Action> {
        self.actions
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.iter().any(|a| a.id() == id)
    }

    /// Ids of all registered steps, in registration order
    pub fn ids(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.id()).collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionInput;
    use crate::schema::InputSchema;
    use crate::streams::Streams;

    struct TestAction(&'static str);

    impl Action for TestAction {
        fn id(&self) -> &str {
            self.0
        }

        fn schema(&self) -> InputSchema {
            InputSchema::new()
        }

        fn execute(&self, _input: &ActionInput, _streams: &mut Streams) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_action_registration() {
        let mut registry = ActionRegistry::new();
        registry.register(TestAction("package:compose"));
        registry.register(TestAction("component:sync"));

        assert!(registry.get("package:compose").is_some());
        assert!(registry.contains("component:sync"));
        assert!(registry.get("platform:prepare").is_none());
        assert_eq!(registry.ids(), vec!["package:compose", "component:sync"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration() {
        let mut registry = ActionRegistry::new();
        registry.register(TestAction("package:compose"));
        registry.register(TestAction("package:compose"));
    }
}
