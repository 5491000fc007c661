//! Job-related API endpoints

use crate::GitLabClient;
use crate::error::Result;
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::domain::job::Job;
use shipwright_core::dto::job::JobInfo;
use tracing::{debug, info};

const JOBS_PER_PAGE: &str = "100";

impl GitLabClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// List all jobs of a pipeline
    ///
    /// Follows the `x-next-page` header so the result holds every job, in the
    /// order the provider returns them.
    pub async fn list_pipeline_jobs(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>> {
        let url = self.api(
            host,
            &[
                "projects",
                &project_id.to_string(),
                "pipelines",
                &pipeline_id.to_string(),
                "jobs",
            ],
        )?;

        let mut jobs = Vec::new();
        let mut page = "1".to_string();

        loop {
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(token.secret())
                .query(&[("per_page", JOBS_PER_PAGE), ("page", page.as_str())])
                .send()
                .await?;

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());

            let batch: Vec<JobInfo> = self.handle_response(response).await?;
            debug!(
                "Fetched {} job(s) of pipeline {} (page {})",
                batch.len(),
                pipeline_id,
                page
            );
            jobs.extend(batch.into_iter().map(Job::from));

            match next_page {
                Some(next) if next != page => page = next,
                _ => break,
            }
        }

        Ok(jobs)
    }

    /// Start a job waiting at a manual gate
    ///
    /// # Arguments
    /// * `job_id` - The job to play
    /// * `pipeline_id` - Pipeline the job belongs to (for diagnostics)
    pub async fn trigger_manual_job(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        job_id: u64,
        pipeline_id: u64,
    ) -> Result<()> {
        let url = self.api(
            host,
            &[
                "projects",
                &project_id.to_string(),
                "jobs",
                &job_id.to_string(),
                "play",
            ],
        )?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token.secret())
            .send()
            .await?;

        self.handle_empty_response(response).await?;
        info!("Job {} of pipeline {} triggered", job_id, pipeline_id);
        Ok(())
    }
}
