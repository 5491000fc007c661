//! The step trait and its input

use shipwright_core::domain::params::{InputParams, ParamValue};

use crate::schema::InputSchema;
use crate::streams::Streams;

/// A named workflow step
///
/// Steps are registered in an [`ActionRegistry`](crate::ActionRegistry) and
/// invoked through an [`ActionExecutor`](crate::ActionExecutor), which
/// validates input against [`Action::schema`] before calling
/// [`Action::execute`].
///
/// # Example
///
/// ```rust
/// use shipwright_actions::{Action, ActionInput, InputSchema, ParamSpec, Streams};
/// use std::io::Write;
///
/// struct Greet;
///
/// impl Action for Greet {
///     fn id(&self) -> &str {
///         "greet"
///     }
///
///     fn schema(&self) -> InputSchema {
///         InputSchema::new().argument(ParamSpec::string("name").required())
///     }
///
///     fn execute(&self, input: &ActionInput, streams: &mut Streams) -> anyhow::Result<()> {
///         writeln!(streams.stdout, "hello {}", input.arg_str("name").unwrap_or_default())?;
///         Ok(())
///     }
/// }
/// ```
pub trait Action: Send + Sync {
    /// Unique step id, e.g. `package:compose`
    fn id(&self) -> &str;

    /// Declared arguments and options
    fn schema(&self) -> InputSchema;

    /// Runs the step with validated input
    ///
    /// # Arguments
    /// * `input` - Arguments, options (defaults applied) and shared flags
    /// * `streams` - Standard streams of the invocation
    fn execute(&self, input: &ActionInput, streams: &mut Streams) -> anyhow::Result<()>;
}

/// Input of a single step invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInput {
    pub args: InputParams,
    pub options: InputParams,
    /// Flags shared by every step of a run
    pub persistent: InputParams,
}

impl ActionInput {
    pub fn new(args: InputParams, options: InputParams, persistent: InputParams) -> Self {
        Self {
            args,
            options,
            persistent,
        }
    }

    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(ParamValue::as_str)
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options.get(name).and_then(ParamValue::as_str)
    }

    /// Boolean option, `false` when absent
    pub fn option_bool(&self, name: &str) -> bool {
        self.options
            .get(name)
            .and_then(ParamValue::as_bool)
            .unwrap_or(false)
    }

    /// Boolean shared flag, `false` when absent
    pub fn persistent_bool(&self, name: &str) -> bool {
        self.persistent
            .get(name)
            .and_then(ParamValue::as_bool)
            .unwrap_or(false)
    }
}
