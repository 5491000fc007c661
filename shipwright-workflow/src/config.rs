//! Workflow configuration
//!
//! Names of the steps the orchestrator invokes and of the CI job it starts.

use serde::{Deserialize, Serialize};
use shipwright_core::domain::job::TARGET_JOB_NAME;

use crate::error::WorkflowError;

/// Workflow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Version bump step
    pub bump_step: String,

    /// Source composition step
    pub compose_step: String,

    /// Environment preparation step; optional, skipped when not registered
    pub prepare_step: String,

    /// Dependency sync step
    pub sync_step: String,

    /// Deployment step
    pub deploy_step: String,

    /// Gated CI job started once the pipeline exists
    pub target_job: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            bump_step: "component:bump".to_string(),
            compose_step: "package:compose".to_string(),
            prepare_step: "platform:prepare".to_string(),
            sync_step: "component:sync".to_string(),
            deploy_step: "platform:deploy".to_string(),
            target_job: TARGET_JOB_NAME.to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let steps = [
            ("bump_step", &self.bump_step),
            ("compose_step", &self.compose_step),
            ("prepare_step", &self.prepare_step),
            ("sync_step", &self.sync_step),
            ("deploy_step", &self.deploy_step),
            ("target_job", &self.target_job),
        ];

        for (field, value) in steps {
            if value.trim().is_empty() {
                return Err(WorkflowError::InvalidConfig(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        Ok(())
    }
}
