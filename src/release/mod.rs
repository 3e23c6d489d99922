//! Release building for DIL.
//!
//! This module turns a DIL source tree into distributable artifacts:
//! versioned source trees, compiled binaries for every enabled cell of the
//! build matrix, API documentation, Debian packages and archives.
//!
//! # Example
//!
//! ```no_run
//! use dil_release::release::{
//!     ArchiveFormat, DescriptorBuilder, ReleasePipeline, SourceSpec, Stages, Version,
//! };
//!
//! # async fn example() -> dil_release::release::Result<()> {
//! let descriptor = DescriptorBuilder::new()
//!     .version(Version::parse("1.042")?)
//!     .source(SourceSpec::Directory("../dil".into()))
//!     .build_dir("build")
//!     .stages(Stages {
//!         binaries: true,
//!         deb: true,
//!         archives: vec![ArchiveFormat::TarGz, ArchiveFormat::Zip],
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let report = ReleasePipeline::new(descriptor).run().await?;
//! println!("{} archives", report.archives.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`settings`] - Run configuration, version and tree layout
//! - [`checksum`] - MD5 payload manifests and SHA-256 artifact checksums
//! - [`compiler`] - Compiler backends and build cells
//! - [`matrix`] - Build matrix enumeration and execution
//! - [`package`] - Debian packaging
//! - [`docs`] - HTML and PDF documentation
//! - [`archive`] - Release archives
//! - [`pipeline`] - End-to-end sequencing
//! - [`stamp`] - Version stamping
//! - [`tool_detection`] - External tool availability

pub mod archive;
pub mod checksum;
pub mod compiler;
pub mod docs;
pub mod error;
pub mod matrix;
pub mod package;
pub mod pipeline;
pub mod process;
pub mod settings;
pub mod stamp;
pub mod tool_detection;
pub mod utils;

pub use archive::{ArchiveArtifact, ArchiveBuilder};
pub use checksum::{ChecksumEntry, ChecksumManifest, ChecksumManifestBuilder};
pub use compiler::{Backend, BuildResult, BuildTarget, CompilerBackend, PlatformPathStyle};
pub use docs::DocumentationDispatcher;
pub use error::{Error, ErrorCategory, Result};
pub use matrix::{BuildMatrix, BuildMatrixExecutor};
pub use package::{DebianPackager, PackageArtifact, PackageManifest, PackagePayload};
pub use pipeline::{ReleasePipeline, ReleaseReport, Stage};
pub use settings::{
    ArchiveFormat, CompilerKind, DescriptorBuilder, PackageSettings, Platform, ReleaseDescriptor,
    SourceSpec, Stages, Version,
};
