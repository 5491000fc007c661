//! Step registry setup
//!
//! Registers the command-backed platform steps and the deploy step, applying
//! the overrides of the config file.

use shipwright_actions::{ActionRegistry, CommandAction, InputSchema, ParamSpec};
use shipwright_deploy::{DeployAction, DeploymentExecutor};
use tracing::debug;

use crate::config::{Config, FileConfig};

/// Ids and input schemas of the command-backed steps
fn command_steps() -> Vec<(&'static str, InputSchema)> {
    vec![
        (
            "component:bump",
            InputSchema::new().option(ParamSpec::bool("last")),
        ),
        (
            "package:compose",
            InputSchema::new()
                .option(ParamSpec::bool("skip-not-versioned"))
                .option(ParamSpec::bool("conflicts-verbosity"))
                .option(ParamSpec::bool("clean")),
        ),
        (
            "platform:prepare",
            InputSchema::new().option(ParamSpec::bool("clean")),
        ),
        ("component:sync", InputSchema::new()),
    ]
}

/// Builds the registry of every step the workflow may invoke
pub fn build_registry(config: &Config) -> ActionRegistry {
    let mut registry = command_registry(&config.file);

    let executor = DeploymentExecutor::new(
        config.file.deploy.clone(),
        config.base_dir.clone(),
        config.environment.clone(),
    );
    registry.register(DeployAction::new(executor));
    registry
}

fn command_registry(file: &FileConfig) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for (id, schema) in command_steps() {
        match command_action(file, id, schema) {
            Some(action) => registry.register(action),
            None => debug!("Step {} is disabled", id),
        }
    }
    registry
}

/// The command-backed step `id` with its overrides applied, `None` when disabled
fn command_action(file: &FileConfig, id: &str, schema: InputSchema) -> Option<CommandAction> {
    let overrides = file.actions.get(id).cloned().unwrap_or_default();
    if overrides.disabled {
        return None;
    }

    let program = overrides
        .program
        .unwrap_or_else(|| file.actions_program.clone());
    let action = CommandAction::new(id, program, schema);
    Some(match overrides.args {
        Some(args) => action.with_base_args(args),
        None => action,
    })
}

/// Whether `id` names a command-backed step
pub fn is_command_step(id: &str) -> bool {
    command_steps().iter().any(|(step, _)| *step == id)
}
