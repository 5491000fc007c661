//! Pipeline-related API endpoints

use crate::GitLabClient;
use crate::error::Result;
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::domain::pipeline::{PipelineRun, PipelineTrigger};
use shipwright_core::dto::pipeline::{CreatePipeline, PipelineInfo};
use tracing::info;

impl GitLabClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new pipeline on the trigger's branch
    ///
    /// # Arguments
    /// * `host` - CI host
    /// * `token` - Access token from [`GitLabClient::get_oauth_token`]
    /// * `project_id` - Project the pipeline runs in
    /// * `trigger` - Branch and pipeline variables
    ///
    /// # Returns
    /// The started pipeline run
    pub async fn create_pipeline(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        trigger: &PipelineTrigger,
    ) -> Result<PipelineRun> {
        let url = self.api(host, &["projects", &project_id.to_string(), "pipeline"])?;
        let body = CreatePipeline::from(trigger);

        let response = self
            .client
            .post(url)
            .bearer_auth(token.secret())
            .json(&body)
            .send()
            .await?;

        let pipeline: PipelineInfo = self.handle_response(response).await?;
        info!(
            "Pipeline {} created on branch {} of project {}",
            pipeline.id, trigger.branch, project_id
        );

        Ok(PipelineRun {
            project_id,
            branch: trigger.branch.clone(),
            pipeline_id: pipeline.id,
            variables: trigger.variables(),
            web_url: pipeline.web_url,
        })
    }
}
