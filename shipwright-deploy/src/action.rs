//! The deployment step
//!
//! Exposes the [`DeploymentExecutor`] as the `platform:deploy` step so the
//! workflow and the standalone deploy command run the same code.

use anyhow::Result;
use shipwright_actions::{Action, ActionInput, InputSchema, ParamSpec, Streams};
use std::path::PathBuf;
use tracing::info;

use crate::executor::{DeployOutcome, DeployRequest, DeploymentExecutor};

pub const DEPLOY_ACTION_ID: &str = "platform:deploy";

/// `platform:deploy <environment> <tags>`
#[derive(Debug, Clone)]
pub struct DeployAction {
    executor: DeploymentExecutor,
}

impl DeployAction {
    pub fn new(executor: DeploymentExecutor) -> Self {
        Self { executor }
    }

    /// Translates validated step input into a deployment request
    pub fn request(input: &ActionInput) -> DeployRequest {
        let non_empty = |name: &str| {
            input
                .option_str(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        DeployRequest {
            environment: input.arg_str("environment").unwrap_or_default().to_string(),
            tags: input.arg_str("tags").unwrap_or_default().to_string(),
            image: non_empty("img").map(PathBuf::from),
            prepare_dir: non_empty("prepare-dir").map(PathBuf::from),
            debug: input.option_bool("debug"),
            check: input.option_bool("check"),
            logs: input.option_bool("logs"),
            password: non_empty("password"),
        }
    }
}

impl Action for DeployAction {
    fn id(&self) -> &str {
        DEPLOY_ACTION_ID
    }

    fn schema(&self) -> InputSchema {
        let prepare_dir = self
            .executor
            .config()
            .prepare_dir
            .to_string_lossy()
            .into_owned();

        InputSchema::new()
            .argument(ParamSpec::string("environment").required())
            .argument(ParamSpec::string("tags").required())
            .option(ParamSpec::bool("debug"))
            .option(ParamSpec::bool("check"))
            .option(ParamSpec::bool("logs"))
            .option(ParamSpec::string("img"))
            .option(ParamSpec::string("prepare-dir").with_default(prepare_dir))
            .option(ParamSpec::string("password"))
    }

    fn execute(&self, input: &ActionInput, streams: &mut Streams) -> Result<()> {
        let request = Self::request(input);
        match self.executor.execute(&request, streams)? {
            DeployOutcome::Deployed => info!("Deployed {} to {}", request.tags, request.environment),
            DeployOutcome::SkippedMissingCache => {
                info!("Deployment to {} skipped", request.environment)
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeployConfig, DeployEnvironment};
    use shipwright_actions::{ActionExecutor, ActionRegistry};
    use shipwright_core::params;

    fn action() -> DeployAction {
        DeployAction::new(DeploymentExecutor::new(
            DeployConfig::default(),
            PathBuf::from("/nonexistent"),
            DeployEnvironment::default(),
        ))
    }

    #[test]
    fn test_request_from_input() {
        let mut input = ActionInput::new(
            params! { "environment" => "prod", "tags" => "core" },
            params! { "img" => "img/p-1.pi", "debug" => true, "password" => "" },
            params! {},
        );
        action().schema().apply_defaults(&mut input);

        let request = DeployAction::request(&input);
        assert_eq!(request.environment, "prod");
        assert_eq!(request.image, Some(PathBuf::from("img/p-1.pi")));
        assert_eq!(request.prepare_dir, Some(PathBuf::from(".plasma/prepare")));
        assert!(request.debug);
        assert!(!request.check);
        assert_eq!(request.password, None);
    }

    #[test]
    fn test_registered_step_fails_with_deploy_cause() {
        let mut registry = ActionRegistry::new();
        registry.register(action());
        let executor = ActionExecutor::new(registry);

        let err = executor
            .invoke(
                DEPLOY_ACTION_ID,
                params! { "environment" => "dev", "tags" => "core" },
                params! {},
                &params! {},
                &mut Streams::null(),
            )
            .unwrap_err();

        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert!(cause.contains("does not exist"), "{}", cause);
    }
}
