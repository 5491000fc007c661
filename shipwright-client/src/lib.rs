//! Shipwright CI Client
//!
//! A small, type-safe client for the CI provider that runs platform pipelines.
//!
//! The workflow only talks to the provider through the [`CiProvider`] capability
//! trait, so another forge can be supported by adding one more implementation.
//! [`GitLabClient`] implements it for GitLab-shaped APIs.
//!
//! # Example
//!
//! ```no_run
//! use shipwright_client::{CiProvider, GitLabClient};
//! use shipwright_core::domain::pipeline::PipelineTrigger;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GitLabClient::new();
//!     let host = "gitlab.example.com";
//!
//!     let token = client.authenticate(host, "alice", "secret").await?;
//!     let project = client.resolve_project(host, &token, "acme/platform").await?;
//!     let run = client
//!         .trigger_pipeline(host, &token, project, &PipelineTrigger {
//!             branch: "main".to_string(),
//!             environment: "dev".to_string(),
//!             selector: "core".to_string(),
//!             debug: false,
//!         })
//!         .await?;
//!
//!     println!("Started pipeline {}", run.pipeline_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod oauth;
mod pipelines;
mod projects;

// Re-export commonly used types
pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::domain::job::Job;
use shipwright_core::domain::pipeline::{PipelineRun, PipelineTrigger};

/// Capabilities the workflow needs from a CI provider
///
/// Every call is made once; the workflow never retries. A failing call is fatal
/// to the workflow that issued it.
#[async_trait]
pub trait CiProvider: Send + Sync {
    /// Exchanges a username/password pair for an access token
    async fn authenticate(&self, host: &str, username: &str, password: &str)
    -> Result<AccessToken>;

    /// Resolves a repository name (or namespaced path) to a project ID
    async fn resolve_project(&self, host: &str, token: &AccessToken, repo: &str) -> Result<u64>;

    /// Starts a pipeline on a branch with the trigger's variables
    async fn trigger_pipeline(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        trigger: &PipelineTrigger,
    ) -> Result<PipelineRun>;

    /// Lists the jobs of a pipeline in provider order
    async fn list_jobs(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>>;

    /// Starts a job waiting at a manual gate
    async fn trigger_job(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        job_id: u64,
        pipeline_id: u64,
    ) -> Result<()>;
}

/// HTTP client for GitLab-shaped CI APIs
///
/// The client is host-agnostic: every call takes the host it talks to, either
/// as a bare domain (`gitlab.example.com`, HTTPS is assumed) or as a full base
/// URL (`http://127.0.0.1:8080`).
#[derive(Debug, Clone)]
pub struct GitLabClient {
    /// HTTP client instance
    client: Client,
}

impl GitLabClient {
    /// Create a new GitLab client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a new GitLab client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns the base URL for a host
    pub fn base_url(host: &str) -> Result<Url> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ClientError::InvalidRequest("CI host is empty".to_string()));
        }

        let raw = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Url::parse(&raw)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid CI host {:?}: {}", host, e)))
    }

    /// Builds an endpoint URL below the host, percent-encoding every segment
    fn endpoint(&self, host: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Self::base_url(host)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest(format!("CI host {:?} cannot be a base", host)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds an endpoint URL below `/api/v4`
    fn api(&self, host: &str, segments: &[&str]) -> Result<Url> {
        let mut all = Vec::with_capacity(segments.len() + 2);
        all.extend_from_slice(&["api", "v4"]);
        all.extend_from_slice(segments);
        self.endpoint(host, &all)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

impl Default for GitLabClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CiProvider for GitLabClient {
    async fn authenticate(
        &self,
        host: &str,
        username: &str,
        password: &str,
    ) -> Result<AccessToken> {
        self.get_oauth_token(host, username, password).await
    }

    async fn resolve_project(&self, host: &str, token: &AccessToken, repo: &str) -> Result<u64> {
        self.resolve_project_id(host, token, repo).await
    }

    async fn trigger_pipeline(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        trigger: &PipelineTrigger,
    ) -> Result<PipelineRun> {
        self.create_pipeline(host, token, project_id, trigger).await
    }

    async fn list_jobs(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        pipeline_id: u64,
    ) -> Result<Vec<Job>> {
        self.list_pipeline_jobs(host, token, project_id, pipeline_id)
            .await
    }

    async fn trigger_job(
        &self,
        host: &str,
        token: &AccessToken,
        project_id: u64,
        job_id: u64,
        pipeline_id: u64,
    ) -> Result<()> {
        self.trigger_manual_job(host, token, project_id, job_id, pipeline_id)
            .await
    }
}
