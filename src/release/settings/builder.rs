//! Builder for constructing a [`ReleaseDescriptor`].

use super::{
    CompilerKind, CompilerSelection, PackageSettings, Platform, ReleaseDescriptor, SourceSpec,
    Stages, Version,
};
use crate::release::{Error, Result, error::Context, tool_detection};
use std::path::{Path, PathBuf};

/// Builder for constructing [`ReleaseDescriptor`].
///
/// # Examples
///
/// ```no_run
/// use dil_release::release::{DescriptorBuilder, Stages, Version, ArchiveFormat};
///
/// # fn example() -> dil_release::release::Result<()> {
/// let descriptor = DescriptorBuilder::new()
///     .version(Version::parse("1.042")?)
///     .build_dir("build")
///     .stages(Stages {
///         binaries: true,
///         archives: vec![ArchiveFormat::TarGz],
///         ..Default::default()
///     })
///     .build()?;
/// assert!(descriptor.destination_root().ends_with("dil.1.042"));
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DescriptorBuilder {
    version: Option<Version>,
    package: PackageSettings,
    source: Option<SourceSpec>,
    build_dir: Option<PathBuf>,
    compiler: Option<CompilerSelection>,
    stages: Stages,
    platforms: Option<Vec<Platform>>,
    doc_generator: Option<PathBuf>,
    packaging_tool: Option<PathBuf>,
    pdf_converter: Option<PathBuf>,
    deb_revision: Option<u32>,
}

impl DescriptorBuilder {
    /// Creates a new descriptor builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the release version.
    ///
    /// # Required
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets product metadata. Default: DIL's own metadata.
    pub fn package_settings(mut self, package: PackageSettings) -> Self {
        self.package = package;
        self
    }

    /// Sets where the release tree comes from.
    ///
    /// Default: git checkout of the current directory.
    pub fn source(mut self, source: SourceSpec) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the build directory.
    ///
    /// # Required
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the compiler backend. Default: `dmd` from `PATH`.
    pub fn compiler(mut self, kind: CompilerKind, executable: Option<PathBuf>) -> Self {
        let executable =
            executable.unwrap_or_else(|| PathBuf::from(kind.default_executable()));
        self.compiler = Some(CompilerSelection { kind, executable });
        self
    }

    /// Sets the enabled stages. Default: nothing optional enabled.
    pub fn stages(mut self, stages: Stages) -> Self {
        self.stages = stages;
        self
    }

    /// Overrides the platforms the matrix builds for.
    ///
    /// Default: detected from the host (see [`tool_detection::enabled_platforms`]).
    pub fn platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = Some(platforms);
        self
    }

    /// Sets the documentation generator executable.
    ///
    /// Default: `bin/dil` (`bin\dil.exe` on Windows) in the current directory.
    pub fn doc_generator<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.doc_generator = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the Debian packaging tool. Default: `dpkg-deb`.
    pub fn packaging_tool<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.packaging_tool = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the PDF converter. Default: `prince`.
    pub fn pdf_converter<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.pdf_converter = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the Debian package revision. Default: 1.
    pub fn deb_revision(mut self, revision: u32) -> Self {
        self.deb_revision = Some(revision);
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// - `version` or `build_dir` missing
    /// - `--deb` requested without building binaries
    /// - a revision of 0
    pub fn build(self) -> Result<ReleaseDescriptor> {
        let version = self.version.context("version is required")?;
        let build_dir = self.build_dir.context("build_dir is required")?;

        let mut stages = self.stages;
        if stages.pdf {
            // The PDF is rendered from the HTML tree.
            stages.docs = true;
        }
        if stages.deb && !stages.binaries {
            return Err(Error::Config(
                "--deb needs binaries to package; drop --no-bin".into(),
            ));
        }

        let deb_revision = self.deb_revision.unwrap_or(1);
        if deb_revision == 0 {
            return Err(Error::Config("package revision must be at least 1".into()));
        }

        let doc_generator = self.doc_generator.unwrap_or_else(|| {
            PathBuf::from("bin").join(format!(
                "{}{}",
                self.package.product_name,
                Platform::host().exe_suffix()
            ))
        });

        Ok(ReleaseDescriptor::new(
            version,
            self.package,
            self.source.unwrap_or(SourceSpec::GitCheckout {
                repository: PathBuf::from("."),
                copy_modified: false,
            }),
            build_dir,
            self.compiler
                .unwrap_or_else(|| CompilerSelection {
                    kind: CompilerKind::Dmd,
                    executable: PathBuf::from(CompilerKind::Dmd.default_executable()),
                }),
            stages,
            self.platforms
                .unwrap_or_else(tool_detection::enabled_platforms),
            doc_generator,
            self.packaging_tool
                .unwrap_or_else(|| PathBuf::from("dpkg-deb")),
            self.pdf_converter.unwrap_or_else(|| PathBuf::from("prince")),
            deb_revision,
        ))
    }
}
