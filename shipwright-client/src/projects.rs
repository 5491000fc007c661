//! Project lookup

use crate::GitLabClient;
use crate::error::{ClientError, Result};
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::dto::project::Project;
use tracing::debug;

impl GitLabClient {
    /// Resolve a repository to its project ID
    ///
    /// A namespaced path (`group/sub/repo`) is looked up directly. A bare
    /// repository name is searched for and the first project whose path or name
    /// matches exactly wins.
    ///
    /// # Errors
    /// [`ClientError::NotFound`] naming the repository when nothing matches.
    pub async fn resolve_project_id(
        &self,
        host: &str,
        token: &AccessToken,
        repo: &str,
    ) -> Result<u64> {
        let repo = repo.trim().trim_matches('/');
        if repo.is_empty() {
            return Err(ClientError::InvalidRequest(
                "repository name is empty".to_string(),
            ));
        }

        if repo.contains('/') {
            self.get_project_by_path(host, token, repo).await
        } else {
            self.search_project(host, token, repo).await
        }
    }

    async fn get_project_by_path(&self, host: &str, token: &AccessToken, path: &str) -> Result<u64> {
        let url = self.api(host, &["projects", path])?;
        debug!("Looking up project {}", path);

        let response = self
            .client
            .get(url)
            .bearer_auth(token.secret())
            .send()
            .await?;

        match self.handle_response::<Project>(response).await {
            Ok(project) => Ok(project.id),
            Err(e) if e.is_not_found() => {
                Err(ClientError::NotFound(format!("project {:?}", path)))
            }
            Err(e) => Err(e),
        }
    }

    async fn search_project(&self, host: &str, token: &AccessToken, name: &str) -> Result<u64> {
        let url = self.api(host, &["projects"])?;
        debug!("Searching project {}", name);

        let response = self
            .client
            .get(url)
            .bearer_auth(token.secret())
            .query(&[("search", name), ("simple", "true"), ("per_page", "100")])
            .send()
            .await?;

        let projects: Vec<Project> = self.handle_response(response).await?;

        projects
            .iter()
            .find(|p| p.path == name)
            .or_else(|| projects.iter().find(|p| p.name == name))
            .map(|p| p.id)
            .ok_or_else(|| ClientError::NotFound(format!("project {:?}", name)))
    }
}
