//! Configuration module
//!
//! Handles the optional `shipwright.yaml` file and the runtime settings
//! every command shares.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use shipwright_deploy::{DeployConfig, DeployEnvironment};
use shipwright_workflow::credentials::DEFAULT_SERVICE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::registry::is_command_step;

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "shipwright.yaml";

/// Contents of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// CI host used when no `--ci-host` is given
    pub ci_host: Option<String>,

    /// Name of the gated CI job to start
    pub target_job: Option<String>,

    /// Program providing the command-backed steps
    pub actions_program: String,

    /// Per-step overrides keyed by step id
    pub actions: BTreeMap<String, ActionOverride>,

    pub deploy: DeployConfig,

    /// Keyring service CI credentials are stored under
    pub keyring_service: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            ci_host: None,
            target_job: None,
            actions_program: "plasmactl".to_string(),
            actions: BTreeMap::new(),
            deploy: DeployConfig::default(),
            keyring_service: DEFAULT_SERVICE.to_string(),
        }
    }
}

/// Override of a command-backed step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionOverride {
    /// Program replacing `actions_program`
    pub program: Option<String>,

    /// Arguments replacing the default `<step id>`
    pub args: Option<Vec<String>>,

    /// Leaves the step unregistered
    pub disabled: bool,
}

impl FileConfig {
    /// Loads the config file
    ///
    /// An explicit path must exist. Without one, `shipwright.yaml` in `dir` is
    /// read if present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.actions_program.trim().is_empty() {
            bail!("actions_program cannot be empty");
        }

        if self.keyring_service.trim().is_empty() {
            bail!("keyring_service cannot be empty");
        }

        if self
            .target_job
            .as_deref()
            .is_some_and(|job| job.trim().is_empty())
        {
            bail!("target_job cannot be empty");
        }

        for (id, action) in &self.actions {
            if !is_command_step(id) {
                bail!("unknown step {} in actions", id);
            }
            if action.program.as_deref().is_some_and(|p| p.trim().is_empty()) {
                bail!("program of action {} cannot be empty", id);
            }
        }

        self.deploy.validate()?;
        Ok(())
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub file: FileConfig,

    /// Directory the command was started in
    pub base_dir: PathBuf,

    /// Environment captured at startup
    pub environment: DeployEnvironment,

    /// Forward `--verbose` to every step
    pub verbose: bool,
}
