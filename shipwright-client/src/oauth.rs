//! OAuth token exchange

use crate::GitLabClient;
use crate::error::{ClientError, Result};
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::dto::oauth::{PasswordGrant, TokenResponse};
use tracing::debug;

impl GitLabClient {
    /// Exchange a username and password for an access token
    ///
    /// Uses the resource owner password credentials grant of `/oauth/token`.
    /// A rejected password is reported as [`ClientError::AuthenticationFailed`]
    /// and is never retried.
    pub async fn get_oauth_token(
        &self,
        host: &str,
        username: &str,
        password: &str,
    ) -> Result<AccessToken> {
        let url = self.endpoint(host, &["oauth", "token"])?;
        debug!("Requesting OAuth token from {}", url);

        let response = self
            .client
            .post(url)
            .form(&PasswordGrant::new(username, password))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::AuthenticationFailed {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = self.handle_response(response).await?;
        if token.access_token.is_empty() {
            return Err(ClientError::ParseError(
                "token endpoint returned an empty access token".to_string(),
            ));
        }

        Ok(AccessToken::new(token.access_token))
    }
}
