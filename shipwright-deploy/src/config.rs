//! Deployment configuration
//!
//! Defines the layout of a prepared platform and how the deployment tool is
//! invoked. Every field has a default matching the standard platform layout;
//! a config file may override any of them.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{DeployError, Result};

/// Deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Deployment tool binary (e.g. "ansible-playbook")
    pub tool: String,

    /// Playbook path, relative to the working directory
    pub playbook: String,

    /// Prepared platform used when no image is given
    pub prepare_dir: PathBuf,

    /// Scratch directory images are extracted into; removed after every run
    pub scratch_dir: PathBuf,

    /// Directory holding one `<environment>.yaml` inventory configuration per environment
    pub inventory_dir: PathBuf,

    /// File name of the inventory cache inside the configured cache path
    pub cache_file: String,

    /// Log file written with `--logs`, relative to the caller's directory
    pub log_file: PathBuf,

    /// Variable carrying the vault password to the askpass helper
    pub secret_variable: String,

    /// Extra-vars key receiving the environment name
    pub target_variable: String,

    /// Tool configuration exported when the caller defines none
    pub tool_config: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            tool: "ansible-playbook".to_string(),
            playbook: "platform/platform.yaml".to_string(),
            prepare_dir: PathBuf::from(".plasma/prepare"),
            scratch_dir: PathBuf::from(".deploy"),
            inventory_dir: PathBuf::from("library/inventories/platform_nodes/configuration"),
            cache_file: "ansible-online_net.cache".to_string(),
            log_file: PathBuf::from("deploy.log"),
            secret_variable: "PLASMA_VAULT_PASS".to_string(),
            target_variable: "machine_target_config".to_string(),
            tool_config: "./ansible.cfg".to_string(),
        }
    }
}

impl DeployConfig {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(invalid("tool cannot be empty"));
        }

        if self.playbook.trim().is_empty() {
            return Err(invalid("playbook cannot be empty"));
        }

        // The scratch directory is deleted recursively
        if !is_plain_relative(&self.scratch_dir) {
            return Err(invalid(
                "scratch_dir must be a relative path below the working directory",
            ));
        }

        if self.cache_file.trim().is_empty() {
            return Err(invalid("cache_file cannot be empty"));
        }

        if self.secret_variable.is_empty() || self.secret_variable.contains('=') {
            return Err(invalid("secret_variable must be a valid variable name"));
        }

        if self.target_variable.is_empty() {
            return Err(invalid("target_variable cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> DeployError {
    DeployError::InvalidConfig(message.to_string())
}

fn is_plain_relative(path: &Path) -> bool {
    let mut normal = 0;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => return false,
        }
    }
    normal > 0
}

/// Snapshot of the caller's environment variables
///
/// Read once at startup and handed to the executor, so the deployment tool
/// sees exactly this environment plus the variables the executor adds.
/// Insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployEnvironment {
    vars: Vec<(String, String)>,
}

impl DeployEnvironment {
    /// Captures the current process environment
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.iter().any(|(k, _)| k == key)
    }

    /// Sets a variable, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.vars.push((key, value)),
        }
    }

    /// Builder form of [`DeployEnvironment::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeployEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = DeployEnvironment::default();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}
