//! Shipwright Deploy
//!
//! Deploys a prepared platform or a platform image to an environment by
//! running the configuration-management tool with a throwaway askpass helper
//! carrying the vault password.

pub mod action;
pub mod askpass;
pub mod config;
pub mod error;
pub mod executor;
pub mod image;
pub mod inventory;
pub mod invocation;

pub use action::{DEPLOY_ACTION_ID, DeployAction};
pub use config::{DeployConfig, DeployEnvironment};
pub use error::{DeployError, Result};
pub use executor::{DeployOutcome, DeployRequest, DeploymentExecutor};
pub use image::{extract, pack_directory};
pub use invocation::DeploymentInvocation;
