//! Workflow errors
//!
//! Every stage wraps the error it hit and names it after the stage, e.g.
//! `compose error: ...`. The wrapped error stays reachable as the source, so
//! the chain reads from the stage that failed down to the root cause.

use shipwright_actions::ActionError;
use shipwright_client::ClientError;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::git::GitError;

/// Errors returned by the [`Workflow`](crate::Workflow)
#[derive(Debug, Error)]
pub enum WorkflowError {
    // =============================================================================
    // Source control
    // =============================================================================
    #[error("commit error: {0}")]
    Commit(#[source] GitError),

    #[error("failed to push changes: {0}")]
    Push(#[source] GitError),

    #[error("failed to get branch name: {0}")]
    Branch(#[source] GitError),

    #[error("failed to get repo name: {0}")]
    Repository(#[source] GitError),

    // =============================================================================
    // Steps
    // =============================================================================
    #[error("bump error: {0}")]
    Bump(#[source] ActionError),

    #[error("compose error: {0}")]
    Compose(#[source] ActionError),

    #[error("prepare error: {0}")]
    Prepare(#[source] ActionError),

    #[error("sync error: {0}")]
    Sync(#[source] ActionError),

    #[error("deploy error: {0}")]
    Deploy(#[source] ActionError),

    // =============================================================================
    // CI
    // =============================================================================
    #[error("CI host is empty: pass it as option or local config")]
    MissingCiHost,

    #[error("failed to get credentials for {url}: {source}")]
    Credentials {
        url: String,
        #[source]
        source: CredentialError,
    },

    #[error("failed to get OAuth token: {0}")]
    Token(#[source] ClientError),

    #[error("failed to get ID of project {repo:?}: {source}")]
    Project {
        repo: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to trigger pipeline: {0}")]
    Pipeline(#[source] ClientError),

    #[error("failed to retrieve jobs in pipeline: {0}")]
    Jobs(#[source] ClientError),

    #[error("no {job_name} job found in pipeline")]
    NoMatchingJob { job_name: String },

    #[error("failed to trigger manual job: {0}")]
    TriggerJob(#[source] ClientError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
