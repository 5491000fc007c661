//! Error types for the deployment executor

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deployment operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Errors that can occur while deploying a platform
#[derive(Debug, Error)]
pub enum DeployError {
    /// Configuration rejected by [`DeployConfig::validate`](crate::DeployConfig::validate)
    #[error("invalid deploy configuration: {0}")]
    InvalidConfig(String),

    #[error("platform image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("failed to extract platform image {}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Archive entry with an absolute path or a `..` component
    #[error("platform image entry {} escapes the extraction directory", .0.display())]
    UnsafeEntry(PathBuf),

    #[error("failed to create platform image {}", .path.display())]
    Pack {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to prepare scratch directory {}", .path.display())]
    ScratchDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no working directory specified (use --prepare-dir or --img)")]
    NoWorkingDirectory,

    #[error("working directory {} does not exist", .0.display())]
    MissingWorkingDirectory(PathBuf),

    #[error("failed to create askpass script")]
    Askpass(#[source] io::Error),

    #[error("failed to create log file {}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool could not be started (or waited for)
    #[error("failed to run {tool}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("{tool} was terminated by a signal")]
    ToolTerminated { tool: String },

    #[error("failed to forward output of {tool}")]
    Output {
        tool: String,
        #[source]
        source: io::Error,
    },
}

impl DeployError {
    /// Exit code of a tool that ran and failed
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DeployError::ToolFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}
