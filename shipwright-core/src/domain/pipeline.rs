//! Pipeline domain types

use serde::{Deserialize, Serialize};

/// Pipeline variable carrying the target environment
pub const ENVIRONMENT_VARIABLE: &str = "TARGET_ENVIRONMENT";
/// Pipeline variable carrying the deployment selector
pub const SELECTOR_VARIABLE: &str = "TARGET_TAGS";
/// Pipeline variable carrying the deployment debug flag
pub const DEBUG_VARIABLE: &str = "ANSIBLE_DEBUG";

/// Parameters of a pipeline trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTrigger {
    pub branch: String,
    pub environment: String,
    pub selector: String,
    pub debug: bool,
}

impl PipelineTrigger {
    /// Pipeline-level variables sent with the trigger, in a fixed order
    pub fn variables(&self) -> Vec<(String, String)> {
        vec![
            (ENVIRONMENT_VARIABLE.to_string(), self.environment.clone()),
            (SELECTOR_VARIABLE.to_string(), self.selector.clone()),
            (DEBUG_VARIABLE.to_string(), self.debug.to_string()),
        ]
    }
}

/// A pipeline started by the workflow
///
/// Discarded once the manual job is triggered; the workflow does not follow the
/// pipeline to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub project_id: u64,
    pub branch: String,
    pub pipeline_id: u64,
    pub variables: Vec<(String, String)>,
    pub web_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_variables() {
        let trigger = PipelineTrigger {
            branch: "main".to_string(),
            environment: "dev".to_string(),
            selector: "platform.interaction".to_string(),
            debug: true,
        };

        let vars = trigger.variables();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0], ("TARGET_ENVIRONMENT".to_string(), "dev".to_string()));
        assert_eq!(
            vars[1],
            ("TARGET_TAGS".to_string(), "platform.interaction".to_string())
        );
        assert_eq!(vars[2], ("ANSIBLE_DEBUG".to_string(), "true".to_string()));
    }
}
