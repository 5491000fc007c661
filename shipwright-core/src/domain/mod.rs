//! Core domain types
//!
//! These types describe one ship workflow: what the caller asked for, the secrets
//! used to reach the CI provider, and the CI objects the workflow touches.
//! They are shared between the orchestrator (which owns the state machine), the
//! CI client (which produces pipeline runs and jobs) and the deployment step.

pub mod credentials;
pub mod job;
pub mod params;
pub mod pipeline;
pub mod request;
