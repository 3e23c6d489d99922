//! Configuration structures for a release run.
//!
//! This module provides the immutable [`ReleaseDescriptor`], the builder that
//! validates and constructs it, the build matrix dimension types and the
//! layout of a release tree.

mod arch;
mod builder;
mod descriptor;
mod layout;
mod package;
mod version;

// Re-export all public types
pub use arch::{Architecture, Configuration, LanguageVariant, Platform};
pub use builder::DescriptorBuilder;
pub use descriptor::{
    ArchiveFormat, CompilerKind, CompilerSelection, ReleaseDescriptor, SourceSpec, Stages,
};
pub use layout::ReleaseLayout;
pub use package::PackageSettings;
pub use version::Version;
