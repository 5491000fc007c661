//! Step invocation
//!
//! Resolves a step by id, validates its input, merges the run's shared flags
//! and executes it. The executor itself touches neither the filesystem nor
//! the network.

use shipwright_core::domain::params::InputParams;
use tracing::{debug, info};

use crate::action::ActionInput;
use crate::error::ActionError;
use crate::registry::ActionRegistry;
use crate::streams::Streams;

/// Runs registered steps
pub struct ActionExecutor {
    registry: ActionRegistry,
}

impl ActionExecutor {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    /// Whether a step is registered, for callers that treat a step as optional
    pub fn has(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Invokes a step
    ///
    /// # Arguments
    /// * `id` - Step id
    /// * `args` - Positional arguments by name
    /// * `options` - Named options
    /// * `persistent` - Shared flags merged into every invocation
    /// * `streams` - Passed to the step unmodified
    ///
    /// # Errors
    /// - [`ActionError::NotFound`] when no step has the id
    /// - [`ActionError::Validation`] when the input breaks the step's schema;
    ///   the step is not run
    /// - [`ActionError::Execution`] when the step fails
    pub fn invoke(
        &self,
        id: &str,
        args: InputParams,
        options: InputParams,
        persistent: &InputParams,
        streams: &mut Streams,
    ) -> Result<(), ActionError> {
        let action = self
            .registry
            .get(id)
            .ok_or_else(|| ActionError::NotFound(id.to_string()))?;

        let schema = action.schema();
        let mut input = ActionInput::new(args, options, persistent.clone());
        schema
            .validate(&input)
            .map_err(|source| ActionError::Validation {
                id: id.to_string(),
                source,
            })?;
        schema.apply_defaults(&mut input);

        debug!("Invoking action {} with {:?}", id, input);
        info!("Running {}", id);

        action
            .execute(&input, streams)
            .map_err(|source| ActionError::Execution {
                id: id.to_string(),
                source,
            })
    }
}
