//! Error types for the command line tool.
//!
//! Wraps the release errors with CLI concerns and maps every failure onto
//! a process exit code.

use crate::release::ErrorCategory;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Exit code of configuration errors (nothing was mutated).
pub const EXIT_CONFIG: i32 = 2;

/// Exit code of tool and IO failures.
pub const EXIT_FAILURE: i32 = 1;

/// Main error type of the `dil-release` binary
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("{0}")]
    Cli(#[from] CliError),

    /// Release pipeline errors
    #[error("{0}")]
    Release(#[from] crate::release::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The `--config` file could not be read or parsed
    #[error("invalid config file {}: {reason}", path.display())]
    InvalidConfig {
        /// File given via `--config`
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReleaseError::Cli(_) => EXIT_CONFIG,
            ReleaseError::Release(e) => match e.category() {
                ErrorCategory::Config => EXIT_CONFIG,
                ErrorCategory::ToolInvocation | ErrorCategory::Io => EXIT_FAILURE,
            },
            ReleaseError::Io(_) => EXIT_FAILURE,
        }
    }
}
