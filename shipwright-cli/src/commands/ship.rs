//! Ship command handler
//!
//! Builds the workflow from its production parts and runs it.

use anyhow::Result;
use clap::Args;
use colored::*;
use shipwright_actions::{ActionExecutor, Streams};
use shipwright_client::GitLabClient;
use shipwright_core::domain::request::{WorkflowOptions, WorkflowRequest};
use shipwright_workflow::credentials::{KeyringStore, TtyPrompter};
use shipwright_workflow::{CredentialResolver, GitCli, Workflow, WorkflowConfig, WorkflowOutcome};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::registry::build_registry;

/// Arguments of `shipwright ship`
#[derive(Args, Debug)]
pub struct ShipArgs {
    /// Target environment (e.g. dev, prod)
    pub environment: String,

    /// Selector of the platform portion to deploy
    pub tags: String,

    /// Run compose, prepare, sync and deploy on this machine
    #[arg(long)]
    pub local: bool,

    /// Skip the version bump
    #[arg(long)]
    pub skip_bump: bool,

    /// Skip environment preparation
    #[arg(long)]
    pub skip_prepare: bool,

    /// Clean composition output before composing
    #[arg(long)]
    pub clean: bool,

    /// Clean preparation output before preparing
    #[arg(long)]
    pub clean_prepare: bool,

    /// Bump only the last commit
    #[arg(long)]
    pub last: bool,

    /// Report composition conflicts verbosely
    #[arg(long)]
    pub conflicts_verbosity: bool,

    /// Run the deployment tool in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Dry-run the deployment tool
    #[arg(long)]
    pub check: bool,

    /// Deploy this platform image directly
    #[arg(long = "img", value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// CI host (falls back to the config file)
    #[arg(long, env = "SHIPWRIGHT_CI_HOST")]
    pub ci_host: Option<String>,

    /// CI username
    #[arg(long, env = "SHIPWRIGHT_CI_USERNAME")]
    pub username: Option<String>,

    /// CI password
    #[arg(long, env = "SHIPWRIGHT_CI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Deprecated: CI is the default
    #[arg(long, hide = true)]
    pub ci: bool,
}

impl ShipArgs {
    /// Turns the arguments into a workflow request
    pub fn into_request(self, config: &Config) -> WorkflowRequest {
        let mut persistent = shipwright_core::params! {};
        if config.verbose {
            persistent.insert("verbose".to_string(), true.into());
        }

        let options = WorkflowOptions {
            skip_bump: self.skip_bump,
            skip_prepare: self.skip_prepare,
            local: self.local,
            clean: self.clean,
            clean_prepare: self.clean_prepare,
            last: self.last,
            conflicts_verbosity: self.conflicts_verbosity,
            debug: self.debug,
            check: self.check,
            image: self.image,
            ci_host: self.ci_host.or_else(|| config.file.ci_host.clone()),
            username: self.username,
            password: self.password,
            persistent,
        };

        WorkflowRequest::new(self.environment, self.tags, options)
    }
}

/// Handle `shipwright ship`
pub async fn handle_ship_command(args: ShipArgs, config: &Config) -> Result<()> {
    if args.ci {
        println!(
            "{}",
            "--ci is deprecated and has no effect: CI is the default, use --local to run locally"
                .yellow()
        );
    }

    let request = args.into_request(config);

    let mut workflow_config = WorkflowConfig::default();
    if let Some(job) = &config.file.target_job {
        workflow_config.target_job = job.clone();
    }
    workflow_config.validate()?;

    let workflow = Workflow::new(
        Arc::new(GitCli::new(&config.base_dir)),
        CredentialResolver::new(
            Arc::new(KeyringStore::new(&config.file.keyring_service)),
            Arc::new(TtyPrompter),
        ),
        Arc::new(GitLabClient::new()),
        ActionExecutor::new(build_registry(config)),
        workflow_config,
    );

    let outcome = workflow.run(&request, &mut Streams::inherit()).await?;

    match outcome {
        WorkflowOutcome::DeployedFromImage | WorkflowOutcome::DeployedLocally => {
            println!("{}", "✓ Platform shipped!".green().bold());
            println!("  Environment: {}", request.environment.cyan());
            println!("  Tags:        {}", request.selector.bold());
        }
        WorkflowOutcome::PipelineTriggered {
            project_id,
            pipeline_id,
            job_id,
            web_url,
        } => {
            println!("{}", "✓ Deploy job started in CI!".green().bold());
            println!("  Project:  {}", project_id.to_string().cyan());
            println!("  Pipeline: {}", pipeline_id.to_string().cyan());
            println!("  Job:      {}", job_id.to_string().dimmed());
            if let Some(url) = web_url {
                println!("  URL:      {}", url.underline());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use clap::Parser;
    use shipwright_deploy::DeployEnvironment;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        ship: ShipArgs,
    }

    fn config(ci_host: Option<&str>, verbose: bool) -> Config {
        Config {
            file: FileConfig {
                ci_host: ci_host.map(str::to_string),
                ..FileConfig::default()
            },
            base_dir: PathBuf::from("."),
            environment: DeployEnvironment::default(),
            verbose,
        }
    }

    fn parse(args: &[&str]) -> ShipArgs {
        let mut argv = vec!["ship"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().ship
    }

    #[test]
    fn test_request_from_flags() {
        let args = parse(&[
            "dev",
            "platform.core",
            "--local",
            "--skip-bump",
            "--clean-prepare",
            "--img",
            "img/p.pi",
        ]);

        let request = args.into_request(&config(None, true));
        assert_eq!(request.environment, "dev");
        assert_eq!(request.selector, "platform.core");
        assert!(request.options.local);
        assert!(request.options.skip_bump);
        assert!(request.options.clean_prepare);
        assert!(!request.options.clean);
        assert_eq!(request.options.image, Some(PathBuf::from("img/p.pi")));
        assert_eq!(request.options.persistent["verbose"].as_bool(), Some(true));
    }

    #[test]
    fn test_ci_host_flag_wins_over_file() {
        let from_file = parse(&["dev", "core"]).into_request(&config(Some("file.example.com"), false));
        assert_eq!(from_file.options.ci_host.as_deref(), Some("file.example.com"));
        assert!(from_file.options.persistent.is_empty());

        let from_flag = parse(&["dev", "core", "--ci-host", "flag.example.com"])
            .into_request(&config(Some("file.example.com"), false));
        assert_eq!(from_flag.options.ci_host.as_deref(), Some("flag.example.com"));
    }

    #[test]
    fn test_deprecated_ci_flag_is_accepted() {
        assert!(parse(&["dev", "core", "--ci"]).ci);
    }
}
