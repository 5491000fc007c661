//! Steps backed by an external program
//!
//! The version bump, composition, preparation and sync steps are provided by
//! the platform tooling. A [`CommandAction`] exposes such a program as a
//! registered step: it validates like any other step and renders its input
//! as a command line.

use anyhow::{Context, Result};
use shipwright_core::domain::params::{InputParams, ParamValue};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

use crate::action::{Action, ActionInput};
use crate::schema::InputSchema;
use crate::streams::{Streams, pipe_input};

/// A step that runs `program [base args] [arguments] [--options] [--shared flags]`
#[derive(Debug, Clone)]
pub struct CommandAction {
    id: String,
    program: String,
    base_args: Vec<String>,
    schema: InputSchema,
}

impl CommandAction {
    /// Creates a step running `program <id> ...`
    ///
    /// # Arguments
    /// * `id` - Step id, also the first argument given to the program
    /// * `program` - Executable to run
    /// * `schema` - Declared arguments and options
    pub fn new(id: impl Into<String>, program: impl Into<String>, schema: InputSchema) -> Self {
        let id = id.into();
        Self {
            base_args: vec![id.clone()],
            id,
            program: program.into(),
            schema,
        }
    }

    /// Replaces the arguments placed before the step input
    pub fn with_base_args(mut self, args: Vec<String>) -> Self {
        self.base_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Renders the full argument list for an input
    ///
    /// Positional arguments follow declaration order. A `true` option becomes
    /// `--name`, a `false` one is left out, a non-empty string becomes
    /// `--name value`.
    pub fn command_line(&self, input: &ActionInput) -> Vec<String> {
        let mut line = self.base_args.clone();

        for spec in &self.schema.arguments {
            if let Some(value) = input.args.get(&spec.name) {
                line.push(value.to_string());
            }
        }

        push_flags(&mut line, &input.options);
        push_flags(&mut line, &input.persistent);
        line
    }
}

fn push_flags(line: &mut Vec<String>, params: &InputParams) {
    for (name, value) in params {
        match value {
            ParamValue::Bool(true) => line.push(format!("--{}", name)),
            ParamValue::Bool(false) => {}
            ParamValue::String(s) if s.is_empty() => {}
            ParamValue::String(s) => {
                line.push(format!("--{}", name));
                line.push(s.clone());
            }
        }
    }
}

impl Action for CommandAction {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema(&self) -> InputSchema {
        self.schema.clone()
    }

    fn execute(&self, input: &ActionInput, streams: &mut Streams) -> Result<()> {
        let args = self.command_line(input);
        debug!("Executing {} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command.args(&args);

        let status = if streams.is_inherited() {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .with_context(|| format!("failed to run {}", self.program))?
        } else {
            let mut child = command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .with_context(|| format!("failed to run {}", self.program))?;
            let child_stdin = child.stdin.take();
            let input = &mut streams.stdin;
            let (output, fed) = thread::scope(|scope| {
                let feeder = scope.spawn(move || pipe_input(input, child_stdin));
                let output = child.wait_with_output();
                let fed = feeder
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("stdin copy thread panicked")));
                (output, fed)
            });
            let output = output.with_context(|| format!("failed to run {}", self.program))?;
            fed.with_context(|| format!("failed to pass input to {}", self.program))?;
            streams.stdout.write_all(&output.stdout)?;
            streams.stderr.write_all(&output.stderr)?;
            output.status
        };

        if !status.success() {
            match status.code() {
                Some(code) => anyhow::bail!("{} exited with code {}", self.program, code),
                None => anyhow::bail!("{} was terminated by a signal", self.program),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamSpec;
    use shipwright_core::params;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn compose() -> CommandAction {
        CommandAction::new(
            "package:compose",
            "plasmactl",
            InputSchema::new()
                .option(ParamSpec::bool("skip-not-versioned"))
                .option(ParamSpec::bool("conflicts-verbosity"))
                .option(ParamSpec::bool("clean")),
        )
    }

    #[test]
    fn test_command_line_renders_flags() {
        let action = compose();
        let input = ActionInput::new(
            params! {},
            params! { "skip-not-versioned" => true, "clean" => false, "conflicts-verbosity" => true },
            params! { "verbose" => true },
        );

        assert_eq!(
            action.command_line(&input),
            vec![
                "package:compose",
                "--conflicts-verbosity",
                "--skip-not-versioned",
                "--verbose"
            ]
        );
    }

    #[test]
    fn test_command_line_orders_arguments_by_schema() {
        let action = CommandAction::new(
            "platform:deploy",
            "plasmactl",
            InputSchema::new()
                .argument(ParamSpec::string("environment").required())
                .argument(ParamSpec::string("tags").required())
                .option(ParamSpec::string("img")),
        );
        let input = ActionInput::new(
            params! { "tags" => "core", "environment" => "dev" },
            params! { "img" => "platform.pi" },
            params! {},
        );

        assert_eq!(
            action.command_line(&input),
            vec!["platform:deploy", "dev", "core", "--img", "platform.pi"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_copied_into_streams() {
        let action = CommandAction::new("component:sync", "echo", InputSchema::new())
            .with_base_args(vec!["synced".to_string()]);
        let out = SharedBuf::default();
        let mut streams = Streams::new(
            Box::new(io::empty()),
            Box::new(out.clone()),
            Box::new(io::sink()),
        );

        action
            .execute(&ActionInput::default(), &mut streams)
            .unwrap();

        assert_eq!(out.contents().trim(), "synced");
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_is_passed_to_the_program() {
        let action = CommandAction::new("component:sync", "cat", InputSchema::new())
            .with_base_args(Vec::new());
        let out = SharedBuf::default();
        let mut streams = Streams::new(
            Box::new(io::Cursor::new(b"component list\n".to_vec())),
            Box::new(out.clone()),
            Box::new(io::sink()),
        );

        action
            .execute(&ActionInput::default(), &mut streams)
            .unwrap();

        assert_eq!(out.contents(), "component list\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_an_error() {
        let action = CommandAction::new("component:bump", "false", InputSchema::new())
            .with_base_args(Vec::new());

        let err = action
            .execute(&ActionInput::default(), &mut Streams::null())
            .unwrap_err();
        assert_eq!(err.to_string(), "false exited with code 1");
    }

    #[test]
    fn test_missing_program_is_a_launch_error() {
        let action = CommandAction::new(
            "component:bump",
            "shipwright-definitely-not-installed",
            InputSchema::new(),
        );

        let err = action
            .execute(&ActionInput::default(), &mut Streams::null())
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to run"));
    }
}
