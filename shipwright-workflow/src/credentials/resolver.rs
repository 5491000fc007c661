use shipwright_core::domain::credentials::Credentials;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use super::{Prompter, SecretStore, SecretStoreError};

/// Errors resolving credentials
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Any secret store failure other than a missing entry
    #[error("the keyring is malformed or wrong passphrase provided")]
    Store(#[source] SecretStoreError),

    #[error("failed to read credentials from the terminal")]
    Prompt(#[source] io::Error),

    #[error("username and password are required for {0}")]
    Empty(String),

    #[error("failed to stage credentials in the secret store")]
    Stage(#[source] SecretStoreError),
}

/// Resolves credentials for a URL from the secret store or the user
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    prompter: Arc<dyn Prompter>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn SecretStore>, prompter: Arc<dyn Prompter>) -> Self {
        Self { store, prompter }
    }

    /// Resolves credentials for `url`
    ///
    /// Stored credentials win. When none are stored, the caller's username
    /// and password are used and whichever is missing is prompted for. New
    /// credentials are staged in the store but not saved; call
    /// [`CredentialResolver::persist`] once they have been accepted.
    ///
    /// # Returns
    /// The credentials and whether they were newly entered
    pub fn resolve(
        &self,
        url: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<(Credentials, bool), CredentialError> {
        match self.store.get_for_url(url) {
            Ok(credentials) => return Ok((credentials, false)),
            Err(SecretStoreError::NotFound(_)) => {}
            Err(e) => {
                error!("Secret store lookup for {} failed: {}", url, e);
                return Err(CredentialError::Store(e));
            }
        }

        let mut username = username.unwrap_or_default().to_string();
        let mut password = password.unwrap_or_default().to_string();

        if username.is_empty() || password.is_empty() {
            info!("Please add login and password for {}", url);
            if username.is_empty() {
                username = self
                    .prompter
                    .prompt_username(url)
                    .map_err(CredentialError::Prompt)?;
            }
            if password.is_empty() {
                password = self
                    .prompter
                    .prompt_password(url)
                    .map_err(CredentialError::Prompt)?;
            }
        }

        if username.trim().is_empty() || password.is_empty() {
            return Err(CredentialError::Empty(url.to_string()));
        }

        let credentials = Credentials::new(url, username.trim(), password);
        self.store
            .add_item(credentials.clone())
            .map_err(CredentialError::Stage)?;

        Ok((credentials, true))
    }

    /// Saves staged credentials
    pub fn persist(&self) -> Result<(), SecretStoreError> {
        self.store.save()
    }
}
