//! Data Transfer Objects for the CI provider API
//!
//! Wire formats of the GitLab-shaped REST API. DTOs are converted into domain
//! types at the client boundary so the workflow never sees provider-specific
//! fields.

pub mod job;
pub mod oauth;
pub mod pipeline;
pub mod project;
