//! Workflow orchestration
//!
//! A run goes `commit check → bump → local | CI`. The local path composes,
//! prepares, syncs and deploys on this machine; the CI path publishes the
//! branch and starts the gated deploy job of a fresh pipeline. A request
//! carrying a platform image skips everything and deploys it directly.
//!
//! Steps run one after another and the first failure ends the run. Nothing
//! is retried.

use shipwright_actions::{ActionExecutor, Streams};
use shipwright_client::CiProvider;
use shipwright_core::domain::job::find_job;
use shipwright_core::domain::params::InputParams;
use shipwright_core::domain::pipeline::PipelineTrigger;
use shipwright_core::domain::request::WorkflowRequest;
use shipwright_core::params;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::WorkflowConfig;
use crate::credentials::CredentialResolver;
use crate::error::{Result, WorkflowError};
use crate::git::GitSynchronizer;

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// A platform image was deployed without touching source control
    DeployedFromImage,

    /// compose, prepare, sync and deploy ran on this machine
    DeployedLocally,

    /// The gated deploy job of a new pipeline was started
    PipelineTriggered {
        project_id: u64,
        pipeline_id: u64,
        job_id: u64,
        web_url: Option<String>,
    },
}

/// Orchestrates one ship run
pub struct Workflow {
    git: Arc<dyn GitSynchronizer>,
    credentials: CredentialResolver,
    ci: Arc<dyn CiProvider>,
    actions: ActionExecutor,
    config: WorkflowConfig,
}

impl Workflow {
    pub fn new(
        git: Arc<dyn GitSynchronizer>,
        credentials: CredentialResolver,
        ci: Arc<dyn CiProvider>,
        actions: ActionExecutor,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            git,
            credentials,
            ci,
            actions,
            config,
        }
    }

    /// Runs the workflow for `request`
    ///
    /// # Errors
    /// The first failing stage, wrapped with the stage name
    pub async fn run(
        &self,
        request: &WorkflowRequest,
        streams: &mut Streams,
    ) -> Result<WorkflowOutcome> {
        let options = &request.options;

        if let Some(image) = &options.image {
            info!("Deploying image {}", image.display());
            self.deploy(
                request,
                params! {
                    "img" => image.to_string_lossy().into_owned(),
                    "debug" => options.debug,
                    "check" => options.check,
                },
                streams,
            )?;
            return Ok(WorkflowOutcome::DeployedFromImage);
        }

        if self.git.ensure_committed().map_err(WorkflowError::Commit)? {
            info!("Committed unversioned changes");
        }

        if options.skip_bump {
            debug!("Skipping {}", self.config.bump_step);
        } else {
            self.step(
                &self.config.bump_step,
                params! {},
                params! { "last" => options.last },
                &options.persistent,
                streams,
            )
            .map_err(WorkflowError::Bump)?;
        }

        if options.local {
            self.run_locally(request, streams)?;
            Ok(WorkflowOutcome::DeployedLocally)
        } else {
            self.run_in_ci(request).await
        }
    }

    fn run_locally(&self, request: &WorkflowRequest, streams: &mut Streams) -> Result<()> {
        let options = &request.options;
        let persistent = &options.persistent;

        self.step(
            &self.config.compose_step,
            params! {},
            params! {
                "skip-not-versioned" => true,
                "conflicts-verbosity" => options.conflicts_verbosity,
                "clean" => options.clean,
            },
            persistent,
            streams,
        )
        .map_err(WorkflowError::Compose)?;

        if options.skip_prepare {
            debug!("Skipping {}", self.config.prepare_step);
        } else if !self.actions.has(&self.config.prepare_step) {
            warn!(
                "Step {} is not available, skipping preparation",
                self.config.prepare_step
            );
        } else {
            self.step(
                &self.config.prepare_step,
                params! {},
                params! { "clean" => options.clean_prepare },
                persistent,
                streams,
            )
            .map_err(WorkflowError::Prepare)?;
        }

        self.step(
            &self.config.sync_step,
            params! {},
            params! {},
            persistent,
            streams,
        )
        .map_err(WorkflowError::Sync)?;

        self.deploy(
            request,
            params! {
                "debug" => options.debug,
                "check" => options.check,
            },
            streams,
        )
    }

    async fn run_in_ci(&self, request: &WorkflowRequest) -> Result<WorkflowOutcome> {
        let options = &request.options;

        self.git
            .ensure_branch_pushed()
            .map_err(WorkflowError::Push)?;
        self.git
            .push_pending_commits()
            .map_err(WorkflowError::Push)?;

        let host = options
            .ci_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(WorkflowError::MissingCiHost)?;

        let (credentials, newly_entered) = self
            .credentials
            .resolve(host, options.username.as_deref(), options.password.as_deref())
            .map_err(|source| WorkflowError::Credentials {
                url: host.to_string(),
                source,
            })?;

        let token = self
            .ci
            .authenticate(host, &credentials.username, &credentials.password)
            .await
            .map_err(WorkflowError::Token)?;

        // Only credentials that just worked are saved
        if newly_entered {
            match self.credentials.persist() {
                Ok(()) => debug!("Saved credentials for {}", host),
                Err(e) => error!("Failed to save credentials for {}: {}", host, e),
            }
        }

        let branch = self.git.current_branch().map_err(WorkflowError::Branch)?;
        let repo = self
            .git
            .repository_name()
            .map_err(WorkflowError::Repository)?;

        let project_id = self
            .ci
            .resolve_project(host, &token, &repo)
            .await
            .map_err(|source| WorkflowError::Project {
                repo: repo.clone(),
                source,
            })?;
        debug!("Project {} has ID {}", repo, project_id);

        let trigger = PipelineTrigger {
            branch,
            environment: request.environment.clone(),
            selector: request.selector.clone(),
            debug: options.debug,
        };
        let run = self
            .ci
            .trigger_pipeline(host, &token, project_id, &trigger)
            .await
            .map_err(WorkflowError::Pipeline)?;
        info!(
            "Pipeline {} started on branch {}",
            run.pipeline_id, run.branch
        );

        let jobs = self
            .ci
            .list_jobs(host, &token, project_id, run.pipeline_id)
            .await
            .map_err(WorkflowError::Jobs)?;

        let job = find_job(&jobs, &self.config.target_job).ok_or_else(|| {
            WorkflowError::NoMatchingJob {
                job_name: self.config.target_job.clone(),
            }
        })?;

        self.ci
            .trigger_job(host, &token, project_id, job.id, run.pipeline_id)
            .await
            .map_err(WorkflowError::TriggerJob)?;
        info!("Started job {} ({})", job.name, job.id);

        Ok(WorkflowOutcome::PipelineTriggered {
            project_id,
            pipeline_id: run.pipeline_id,
            job_id: job.id,
            web_url: run.web_url,
        })
    }

    fn deploy(
        &self,
        request: &WorkflowRequest,
        options: InputParams,
        streams: &mut Streams,
    ) -> Result<()> {
        self.step(
            &self.config.deploy_step,
            params! {
                "environment" => request.environment.as_str(),
                "tags" => request.selector.as_str(),
            },
            options,
            &request.options.persistent,
            streams,
        )
        .map_err(WorkflowError::Deploy)
    }

    fn step(
        &self,
        id: &str,
        args: InputParams,
        options: InputParams,
        persistent: &InputParams,
        streams: &mut Streams,
    ) -> std::result::Result<(), shipwright_actions::ActionError> {
        self.actions.invoke(id, args, options, persistent, streams)
    }
}
