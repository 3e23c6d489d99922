//! Error types for release operations.
//!
//! Every failure of the pipeline maps onto one of three categories:
//! configuration problems detected before anything is mutated, external tool
//! invocations that exited unsuccessfully, and filesystem errors.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used for exit codes and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad user input or missing external tool; nothing was mutated.
    Config,
    /// An external tool ran and failed.
    ToolInvocation,
    /// Filesystem or other runtime failure.
    Io,
}

/// Errors produced while building a release.
#[derive(Debug, Error)]
pub enum Error {
    /// Version string does not follow `MAJOR.MINOR[-SUFFIX]`.
    #[error("invalid VERSION '{0}'; format: /\\d.\\d\\d\\d(-\\w+)?/ e.g.: 1.123")]
    VersionFormat(String),

    /// A version marker could not be found in the source file.
    #[error("version marker `{marker}` not found in {}", path.display())]
    VersionMarkerMissing {
        /// Marker name, e.g. `VERSION_MAJOR`.
        marker: &'static str,
        /// File that was searched.
        path: PathBuf,
    },

    /// Invalid configuration supplied by the user.
    #[error("{0}")]
    Config(String),

    /// A required external tool could not be located.
    #[error("the executable '{0}' could not be located")]
    ToolNotFound(String),

    /// An external tool could not be spawned.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command that could not be spawned.
        command: String,
        /// Underlying spawn error.
        error: io::Error,
    },

    /// An external tool exited with a non-zero status.
    #[error("`{command}` failed ({status})\n{diagnostics}")]
    ToolInvocation {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured stderr/stdout of the tool.
        diagnostics: String,
    },

    /// The Debian packaging step failed.
    #[error("packaging failed: {0}")]
    Packaging(String),

    /// Filesystem operation with context.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying IO error.
        error: io::Error,
    },

    /// Plain IO error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Directory traversal error.
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failed.
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Invalid glob pattern.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Zip archive error.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// Report serialization error.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::VersionFormat(_)
            | Error::VersionMarkerMissing { .. }
            | Error::Config(_)
            | Error::ToolNotFound(_) => ErrorCategory::Config,
            Error::CommandFailed { .. } | Error::ToolInvocation { .. } | Error::Packaging(_) => {
                ErrorCategory::ToolInvocation
            }
            _ => ErrorCategory::Io,
        }
    }
}

/// Extension trait attaching filesystem context to IO results.
pub trait ErrorExt<T> {
    /// Wraps the error with a description of the operation and the path.
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Converts missing values into [`Error::GenericError`].
pub trait Context<T> {
    /// Attaches a message to the failure case.
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Returns early with a [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::release::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::release::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            Error::VersionFormat("1.2".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::ToolNotFound("dmd".into()).category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::Packaging("dpkg-deb exited with 2".into()).category(),
            ErrorCategory::ToolInvocation
        );
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::IoError(io).category(), ErrorCategory::Io);
    }

    #[test]
    fn fs_context_keeps_path() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let err = result.fs_context("reading", "/tmp/x").unwrap_err();
        assert!(err.to_string().starts_with("reading /tmp/x"));
    }
}
