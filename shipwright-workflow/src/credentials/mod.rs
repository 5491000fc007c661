//! CI credentials
//!
//! Credentials are looked up by URL in a persistent secret store. Unknown
//! URLs fall back to an interactive prompt; freshly entered credentials are
//! staged in the store and only persisted once the caller has proven them
//! valid.

mod keyring_store;
mod prompt;
mod resolver;

pub use keyring_store::{DEFAULT_SERVICE, KeyringStore};
pub use prompt::{Prompter, TtyPrompter};
pub use resolver::{CredentialError, CredentialResolver};

use shipwright_core::domain::credentials::Credentials;
use thiserror::Error;

/// Errors reported by a [`SecretStore`]
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Nothing stored for the URL; recoverable by prompting
    #[error("no credentials stored for {0}")]
    NotFound(String),

    /// Stored data exists but cannot be decoded
    #[error("stored credentials are corrupt: {0}")]
    Corrupt(String),

    /// The store itself failed (locked, inaccessible, ...)
    #[error("secret store failure: {0}")]
    Backend(String),
}

/// Persistent credential storage keyed by URL
pub trait SecretStore: Send + Sync {
    /// Looks up credentials by exact URL
    fn get_for_url(&self, url: &str) -> Result<Credentials, SecretStoreError>;

    /// Stages credentials; they are persisted by [`SecretStore::save`]
    fn add_item(&self, credentials: Credentials) -> Result<(), SecretStoreError>;

    /// Persists staged credentials
    fn save(&self) -> Result<(), SecretStoreError>;
}
