//! Shipwright Core
//!
//! Core types shared by every Shipwright crate.
//!
//! This crate contains:
//! - Domain types: the workflow request, credentials, pipeline runs and jobs
//! - DTOs: wire formats of the GitLab-shaped CI API

pub mod domain;
pub mod dto;
