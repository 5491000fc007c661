//! Deploy command handler
//!
//! Runs the registered deploy step directly, outside the ship workflow.

use anyhow::Result;
use clap::Args;
use colored::*;
use shipwright_actions::{ActionExecutor, Streams};
use shipwright_core::domain::params::InputParams;
use shipwright_core::params;
use shipwright_deploy::DEPLOY_ACTION_ID;
use std::path::PathBuf;

use crate::config::Config;
use crate::registry::build_registry;

/// Arguments of `shipwright deploy`
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Target environment (e.g. dev, prod)
    pub environment: String,

    /// Selector of the platform portion to deploy
    pub tags: String,

    /// Platform image to extract and deploy
    #[arg(long = "img", value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Prepared platform directory used when no image is given
    #[arg(long, value_name = "DIR")]
    pub prepare_dir: Option<PathBuf>,

    /// Run the deployment tool in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Dry-run the deployment tool
    #[arg(long)]
    pub check: bool,

    /// Also write the tool output to the deploy log
    #[arg(long)]
    pub logs: bool,

    /// Vault password handed to the tool through the askpass helper
    #[arg(long, env = "SHIPWRIGHT_VAULT_PASSWORD", hide_env_values = true)]
    pub vault_password: Option<String>,
}

impl DeployArgs {
    /// Arguments and options of the deploy step
    fn step_input(&self) -> (InputParams, InputParams) {
        let args = params! {
            "environment" => self.environment.as_str(),
            "tags" => self.tags.as_str(),
        };

        let mut options = params! {
            "debug" => self.debug,
            "check" => self.check,
            "logs" => self.logs,
        };
        if let Some(image) = &self.image {
            options.insert("img".to_string(), image.to_string_lossy().into_owned().into());
        }
        if let Some(dir) = &self.prepare_dir {
            options.insert(
                "prepare-dir".to_string(),
                dir.to_string_lossy().into_owned().into(),
            );
        }
        if let Some(password) = &self.vault_password {
            options.insert("password".to_string(), password.as_str().into());
        }

        (args, options)
    }
}

/// Handle `shipwright deploy`
pub fn handle_deploy_command(args: DeployArgs, config: &Config) -> Result<()> {
    let executor = ActionExecutor::new(build_registry(config));
    let (step_args, options) = args.step_input();

    let mut persistent = params! {};
    if config.verbose {
        persistent.insert("verbose".to_string(), true.into());
    }

    executor.invoke(
        DEPLOY_ACTION_ID,
        step_args,
        options,
        &persistent,
        &mut Streams::inherit(),
    )?;

    println!("{}", "✓ Deployment finished".green().bold());
    println!("  Environment: {}", args.environment.cyan());
    println!("  Tags:        {}", args.tags.bold());
    if args.logs {
        let log = config.base_dir.join(&config.file.deploy.log_file);
        println!("  Log:         {}", log.display().to_string().dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        deploy: DeployArgs,
    }

    #[test]
    fn test_step_input() {
        let cli = TestCli::try_parse_from([
            "deploy",
            "prod",
            "platform.core",
            "--img",
            "img/platform-v1.pi",
            "--check",
            "--vault-password",
            "s3cret",
        ])
        .unwrap();

        let (args, options) = cli.deploy.step_input();
        assert_eq!(args["environment"].as_str(), Some("prod"));
        assert_eq!(args["tags"].as_str(), Some("platform.core"));
        assert_eq!(options["img"].as_str(), Some("img/platform-v1.pi"));
        assert_eq!(options["check"].as_bool(), Some(true));
        assert_eq!(options["debug"].as_bool(), Some(false));
        assert_eq!(options["password"].as_str(), Some("s3cret"));
        // Left to the step's default
        assert!(!options.contains_key("prepare-dir"));
    }
}
