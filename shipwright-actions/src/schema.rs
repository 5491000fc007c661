//! Declared input contract of a step

use shipwright_core::domain::params::{InputParams, ParamValue};

use crate::action::ActionInput;
use crate::error::ValidationError;

/// Value kind accepted by a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    String,
}

impl ParamKind {
    fn name(self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::String => "string",
        }
    }

    fn accepts(self, value: &ParamValue) -> bool {
        matches!(
            (self, value),
            (ParamKind::Bool, ParamValue::Bool(_)) | (ParamKind::String, ParamValue::String(_))
        )
    }
}

/// A single declared argument or option
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    /// Optional boolean parameter defaulting to `false`
    pub fn bool(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Bool,
            required: false,
            default: Some(ParamValue::Bool(false)),
        }
    }

    /// Optional string parameter without a default
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::String,
            required: false,
            default: None,
        }
    }

    /// Marks the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self.default = None;
        self
    }

    /// Sets the value used when the caller omits the parameter
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Positional arguments and named options a step accepts
///
/// Arguments are kept in declaration order, which is the order they are
/// handed to command-backed steps.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    pub arguments: Vec<ParamSpec>,
    pub options: Vec<ParamSpec>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, spec: ParamSpec) -> Self {
        self.arguments.push(spec);
        self
    }

    pub fn option(mut self, spec: ParamSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Checks arguments and options against the declared contract
    ///
    /// Values are never coerced: a string where a bool is declared is an
    /// error. Shared flags are not part of a step's contract and are not
    /// checked here.
    pub fn validate(&self, input: &ActionInput) -> Result<(), ValidationError> {
        check(
            &self.arguments,
            &input.args,
            ValidationError::UnknownArgument,
            ValidationError::MissingArgument,
        )?;
        check(
            &self.options,
            &input.options,
            ValidationError::UnknownOption,
            ValidationError::MissingOption,
        )
    }

    /// Fills declared defaults for parameters the caller omitted
    pub fn apply_defaults(&self, input: &mut ActionInput) {
        fill(&self.arguments, &mut input.args);
        fill(&self.options, &mut input.options);
    }
}

fn check(
    specs: &[ParamSpec],
    values: &InputParams,
    unknown: fn(String) -> ValidationError,
    missing: fn(String) -> ValidationError,
) -> Result<(), ValidationError> {
    for (name, value) in values {
        let spec = specs
            .iter()
            .find(|s| &s.name == name)
            .ok_or_else(|| unknown(name.clone()))?;

        if !spec.kind.accepts(value) {
            return Err(ValidationError::WrongKind {
                name: name.clone(),
                expected: spec.kind.name(),
                found: value.kind_name(),
            });
        }
    }

    if let Some(spec) = specs
        .iter()
        .find(|s| s.required && !values.contains_key(&s.name))
    {
        return Err(missing(spec.name.clone()));
    }

    Ok(())
}

fn fill(specs: &[ParamSpec], values: &mut InputParams) {
    for spec in specs {
        if let Some(default) = &spec.default {
            values
                .entry(spec.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
}
