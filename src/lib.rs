//! Release packager for the DIL compiler
//!
//! This library builds DIL releases:
//! - versioned source trees checked out from git or copied from a folder
//! - binaries for every enabled platform and language variant
//! - HTML and PDF API documentation
//! - Debian packages
//! - 7z, tar.gz, tar.bz2 and zip archives
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod metadata;
pub mod release;
pub mod source;

// Re-export commonly used types
pub use error::{CliError, ReleaseError, Result};
