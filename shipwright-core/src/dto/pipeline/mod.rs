//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::PipelineTrigger;

/// A pipeline-level variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

/// Request to create a pipeline on a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipeline {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub variables: Vec<Variable>,
}

impl From<&PipelineTrigger> for CreatePipeline {
    fn from(trigger: &PipelineTrigger) -> Self {
        Self {
            git_ref: trigger.branch.clone(),
            variables: trigger
                .variables()
                .into_iter()
                .map(|(key, value)| Variable { key, value })
                .collect(),
        }
    }
}

/// Pipeline as returned after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub id: u64,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
