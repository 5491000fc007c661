//! Shipwright Actions
//!
//! Named workflow steps and the executor that runs them.
//! It includes:
//! - The [`Action`] trait every step implements
//! - Input schemas and their validation
//! - A registry of steps keyed by id
//! - The executor that validates, merges shared flags and runs a step
//! - Command-backed steps that delegate to an external program

pub mod action;
pub mod command;
pub mod error;
pub mod executor;
pub mod registry;
pub mod schema;
pub mod streams;

pub use action::{Action, ActionInput};
pub use command::CommandAction;
pub use error::{ActionError, ValidationError};
pub use executor::ActionExecutor;
pub use registry::ActionRegistry;
pub use schema::{InputSchema, ParamKind, ParamSpec};
pub use streams::{Streams, pipe_input};
