//! Deployment tool command line and environment

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{DeployConfig, DeployEnvironment};

pub const TOOL_CONFIG_VARIABLE: &str = "ANSIBLE_CONFIG";
pub const VAULT_PASSWORD_FILE_VARIABLE: &str = "ANSIBLE_VAULT_PASSWORD_FILE";
pub const OTEL_ENDPOINT_VARIABLE: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const OTEL_ATTRIBUTES_VARIABLE: &str = "OTEL_RESOURCE_ATTRIBUTES";

/// A fully resolved deployment tool invocation
///
/// `env` is the complete environment of the subprocess except the secret,
/// which is kept apart so it never shows up in logs.
#[derive(Clone)]
pub struct DeploymentInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: DeployEnvironment,
    pub askpass: PathBuf,
    secret_variable: String,
    secret: Option<String>,
}

/// Per-run parameters of an invocation
#[derive(Debug, Clone, Copy)]
pub struct InvocationParams<'a> {
    pub environment: &'a str,
    pub tags: &'a str,
    pub debug: bool,
    pub check: bool,
    pub password: Option<&'a str>,
}

impl DeploymentInvocation {
    /// Builds the invocation
    ///
    /// # Arguments
    /// * `config` - Tool, playbook and variable names
    /// * `params` - Environment, tags and flags of this run
    /// * `caller_env` - The caller's environment, inherited by the tool
    /// * `askpass` - Path of the askpass helper
    pub fn build(
        config: &DeployConfig,
        params: InvocationParams<'_>,
        caller_env: &DeployEnvironment,
        askpass: &Path,
    ) -> Self {
        let mut args = vec![
            config.playbook.clone(),
            "--tags".to_string(),
            params.tags.to_string(),
            "--extra-vars".to_string(),
            format!("{}={}", config.target_variable, params.environment),
        ];
        if params.debug {
            args.push("-vvv".to_string());
        }
        if params.check {
            args.push("--check".to_string());
        }

        let mut env = caller_env.clone();
        if !env.contains(TOOL_CONFIG_VARIABLE) {
            env.set(TOOL_CONFIG_VARIABLE, config.tool_config.clone());
        }

        if caller_env
            .get(OTEL_ENDPOINT_VARIABLE)
            .is_some_and(|endpoint| !endpoint.is_empty())
        {
            let attributes = override_attribute(
                caller_env.get(OTEL_ATTRIBUTES_VARIABLE).unwrap_or_default(),
                "env",
                params.environment,
            );
            env.set(OTEL_ATTRIBUTES_VARIABLE, attributes);
            env.set("OTEL_EXPORTER_OTLP_TIMEOUT", "30000");
            env.set("OTEL_EXPORTER_OTLP_COMPRESSION", "gzip");
        }

        let askpass_value = askpass.to_string_lossy().into_owned();
        env.set("SSH_ASKPASS", askpass_value.clone());
        env.set("SSH_ASKPASS_REQUIRE", "force");
        env.set(VAULT_PASSWORD_FILE_VARIABLE, askpass_value);

        Self {
            program: config.tool.clone(),
            args,
            env,
            askpass: askpass.to_path_buf(),
            secret_variable: config.secret_variable.clone(),
            secret: params.password.map(str::to_string),
        }
    }

    /// The secret variable and its value, when the caller supplied a password
    ///
    /// Without one, the tool inherits whatever the caller's environment holds.
    pub fn secret(&self) -> Option<(&str, &str)> {
        self.secret
            .as_deref()
            .map(|value| (self.secret_variable.as_str(), value))
    }

    /// Command line suitable for display
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Debug for DeploymentInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentInvocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("askpass", &self.askpass)
            .field("secret_variable", &self.secret_variable)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Rewrites a `k=v,k=v` attribute list with one key overridden
///
/// Order of the other attributes is kept; an absent key is appended.
/// Items without `=` are dropped.
fn override_attribute(attributes: &str, key: &str, value: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = attributes
        .split(',')
        .filter_map(|item| item.split_once('='))
        .collect();

    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(pair) => pair.1 = value,
        None => pairs.push((key, value)),
    }

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
