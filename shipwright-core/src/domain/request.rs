//! Workflow request types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::params::InputParams;

/// A request to ship a platform to an environment
///
/// Immutable once the workflow starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRequest {
    /// Target environment name (e.g. "dev", "prod")
    pub environment: String,
    /// Selector of the platform portion to deploy, passed through as deployment tags
    pub selector: String,
    pub options: WorkflowOptions,
}

impl WorkflowRequest {
    pub fn new(
        environment: impl Into<String>,
        selector: impl Into<String>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            environment: environment.into(),
            selector: selector.into(),
            options,
        }
    }
}

/// Options controlling which phases of the workflow run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowOptions {
    /// Skip the version bump step
    pub skip_bump: bool,
    /// Skip the environment preparation step
    pub skip_prepare: bool,
    /// Run compose/prepare/sync/deploy on this machine instead of in CI
    pub local: bool,
    /// Clean composition output before composing
    pub clean: bool,
    /// Clean preparation output before preparing
    pub clean_prepare: bool,
    /// Bump only the last commit
    pub last: bool,
    /// Report composition conflicts verbosely
    pub conflicts_verbosity: bool,
    /// Run the deployment tool in debug mode
    pub debug: bool,
    /// Dry-run the deployment tool
    pub check: bool,
    /// Deploy straight from a packaged platform image
    pub image: Option<PathBuf>,
    /// CI host (e.g. "gitlab.example.com")
    pub ci_host: Option<String>,
    /// CI username supplied by the caller
    pub username: Option<String>,
    /// CI password supplied by the caller
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Flags shared by every step of the workflow (e.g. verbosity)
    pub persistent: InputParams,
}
