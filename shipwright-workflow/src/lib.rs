//! Shipwright Workflow
//!
//! The ship workflow: reconciles the local repository with its remote, then
//! either runs the platform steps locally or hands them to a CI pipeline.
//!
//! This crate contains:
//! - Git synchronization ([`GitSynchronizer`], [`GitCli`])
//! - Credential resolution from the OS keyring with a terminal fallback
//! - The [`Workflow`] orchestrator

pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod workflow;

pub use config::WorkflowConfig;
pub use credentials::{CredentialError, CredentialResolver, SecretStore, SecretStoreError};
pub use error::{Result, WorkflowError};
pub use git::{GitCli, GitError, GitSynchronizer};
pub use workflow::{Workflow, WorkflowOutcome};
