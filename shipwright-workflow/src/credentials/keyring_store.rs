use serde::{Deserialize, Serialize};
use shipwright_core::domain::credentials::Credentials;
use std::sync::Mutex;
use tracing::debug;

use super::{SecretStore, SecretStoreError};

/// Service name of keyring entries unless configured otherwise
pub const DEFAULT_SERVICE: &str = "shipwright";

/// Keyring payload: one entry per URL, the secret holding username and password
#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    password: String,
}

/// [`SecretStore`] backed by the operating system keyring
pub struct KeyringStore {
    service: String,
    staged: Mutex<Vec<Credentials>>,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            staged: Mutex::new(Vec::new()),
        }
    }

    fn entry(&self, url: &str) -> Result<keyring::Entry, SecretStoreError> {
        keyring::Entry::new(&self.service, url).map_err(backend)
    }

    fn staged(&self) -> std::sync::MutexGuard<'_, Vec<Credentials>> {
        // Staged items stay usable even if a holder panicked
        self.staged.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl SecretStore for KeyringStore {
    fn get_for_url(&self, url: &str) -> Result<Credentials, SecretStoreError> {
        if let Some(staged) = self.staged().iter().find(|c| c.url == url) {
            return Ok(staged.clone());
        }

        let secret = match self.entry(url)?.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => return Err(SecretStoreError::NotFound(url.to_string())),
            Err(keyring::Error::BadEncoding(_)) => {
                return Err(SecretStoreError::Corrupt(format!(
                    "entry for {} is not valid UTF-8",
                    url
                )));
            }
            Err(e) => return Err(backend(e)),
        };

        let stored: StoredCredentials = serde_json::from_str(&secret)
            .map_err(|e| SecretStoreError::Corrupt(format!("entry for {}: {}", url, e)))?;

        Ok(Credentials::new(url, stored.username, stored.password))
    }

    fn add_item(&self, credentials: Credentials) -> Result<(), SecretStoreError> {
        let mut staged = self.staged();
        staged.retain(|c| c.url != credentials.url);
        staged.push(credentials);
        Ok(())
    }

    fn save(&self) -> Result<(), SecretStoreError> {
        let mut staged = self.staged();
        for credentials in staged.iter() {
            let payload = serde_json::to_string(&StoredCredentials {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
            })
            .map_err(|e| SecretStoreError::Backend(e.to_string()))?;

            self.entry(&credentials.url)?
                .set_password(&payload)
                .map_err(backend)?;
            debug!("Saved credentials for {} to keyring", credentials.url);
        }
        staged.clear();
        Ok(())
    }
}

fn backend(e: keyring::Error) -> SecretStoreError {
    SecretStoreError::Backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only staged items are exercised; the OS keyring is not touched.

    #[test]
    fn test_staged_items_are_visible_before_save() {
        let store = KeyringStore::new("shipwright-test");
        store
            .add_item(Credentials::new("gitlab.example.com", "alice", "old"))
            .unwrap();
        store
            .add_item(Credentials::new("gitlab.example.com", "alice", "new"))
            .unwrap();

        let found = store.get_for_url("gitlab.example.com").unwrap();
        assert_eq!(found.password, "new");
        assert_eq!(store.staged().len(), 1);
    }
}
