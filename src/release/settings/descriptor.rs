//! The immutable run configuration.

use super::{PackageSettings, Platform, ReleaseLayout, Version};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Compiler backend implementation to drive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerKind {
    /// The reference D compiler.
    Dmd,
    /// The LLVM-based D compiler.
    Ldc,
}

impl CompilerKind {
    /// Executable looked up in `PATH` when `--cmp-exe` is not given.
    pub fn default_executable(self) -> &'static str {
        match self {
            CompilerKind::Dmd => "dmd",
            CompilerKind::Ldc => "ldc2",
        }
    }
}

/// The selected compiler and the executable used to invoke it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerSelection {
    pub kind: CompilerKind,
    pub executable: PathBuf,
}

/// Archive formats the release can be shipped in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum ArchiveFormat {
    #[serde(rename = "7z")]
    SevenZip,
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "tar.bz2")]
    TarBz2,
    #[serde(rename = "zip")]
    Zip,
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::SevenZip => "7z",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::Zip => "zip",
        }
    }

    /// External tool needed to write this format, if any.
    pub fn required_tool(self) -> Option<&'static str> {
        match self {
            ArchiveFormat::SevenZip => Some("7z"),
            ArchiveFormat::TarBz2 => Some("tar"),
            ArchiveFormat::TarGz | ArchiveFormat::Zip => None,
        }
    }
}

/// Where the release tree comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceSpec {
    /// Copy an existing directory.
    Directory(PathBuf),
    /// Export `HEAD` of a git repository.
    GitCheckout {
        /// Working directory of the repository.
        repository: PathBuf,
        /// Also copy files modified in the working directory.
        copy_modified: bool,
    },
}

/// Optional pipeline stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stages {
    pub docs: bool,
    pub pdf: bool,
    pub binaries: bool,
    pub deb: bool,
    /// Emit debug symbols for debug builds on every platform.
    pub debug_symbols: bool,
    /// Archive formats in the order they are produced.
    pub archives: Vec<ArchiveFormat>,
}

impl Stages {
    /// True when the documentation tree is kept in the release.
    pub fn keeps_docs(&self) -> bool {
        self.docs || self.pdf
    }
}

/// Configuration of one release run.
///
/// Constructed once from validated input via
/// [`DescriptorBuilder`](super::DescriptorBuilder) and passed by reference
/// to every component. Never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ReleaseDescriptor {
    version: Version,
    package: PackageSettings,
    source: SourceSpec,
    build_dir: PathBuf,
    destination_root: PathBuf,
    temporary_root: PathBuf,
    package_root: PathBuf,
    compiler: CompilerSelection,
    stages: Stages,
    platforms: Vec<Platform>,
    doc_generator: PathBuf,
    packaging_tool: PathBuf,
    pdf_converter: PathBuf,
    deb_revision: u32,
}

impl ReleaseDescriptor {
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Product name, also the payload file prefix.
    pub fn product_name(&self) -> &str {
        &self.package.product_name
    }

    pub fn source(&self) -> &SourceSpec {
        &self.source
    }

    /// Directory holding the release tree, packages and archives.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Release tree root, e.g. `build/dil.1.042`.
    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Layout helper for the destination tree.
    pub fn layout(&self) -> ReleaseLayout {
        ReleaseLayout::new(&self.destination_root)
    }

    /// Scratch directory, removed when the run ends.
    pub fn temporary_root(&self) -> &Path {
        &self.temporary_root
    }

    /// Work directory of the Debian package skeleton, e.g.
    /// `build/dil.1.042.pkg`. Kept when sealing fails.
    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn compiler(&self) -> &CompilerSelection {
        &self.compiler
    }

    pub fn stages(&self) -> &Stages {
        &self.stages
    }

    /// Platforms the build matrix is enabled for.
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Executable that renders the HTML documentation.
    pub fn doc_generator(&self) -> &Path {
        &self.doc_generator
    }

    /// Tool sealing Debian packages (`dpkg-deb`).
    pub fn packaging_tool(&self) -> &Path {
        &self.packaging_tool
    }

    /// HTML to PDF converter (`prince`).
    pub fn pdf_converter(&self) -> &Path {
        &self.pdf_converter
    }

    /// Debian package revision.
    pub fn deb_revision(&self) -> u32 {
        self.deb_revision
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        version: Version,
        package: PackageSettings,
        source: SourceSpec,
        build_dir: PathBuf,
        compiler: CompilerSelection,
        stages: Stages,
        platforms: Vec<Platform>,
        doc_generator: PathBuf,
        packaging_tool: PathBuf,
        pdf_converter: PathBuf,
        deb_revision: u32,
    ) -> Self {
        let release_name = format!("{}.{}", package.product_name, version);
        let destination_root = build_dir.join(&release_name);
        let temporary_root = build_dir.join(format!("{release_name}.tmp"));
        let package_root = build_dir.join(format!("{release_name}.pkg"));
        Self {
            version,
            package,
            source,
            build_dir,
            destination_root,
            temporary_root,
            package_root,
            compiler,
            stages,
            platforms,
            doc_generator,
            packaging_tool,
            pdf_converter,
            deb_revision,
        }
    }
}
