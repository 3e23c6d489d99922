//! End-to-end release sequencing.
//!
//! The [`ReleasePipeline`] walks a fixed sequence of states:
//!
//! ```text
//! Init → TreePrepared → VersionStamped → DocsBuilt? → BinariesBuilt?
//!      → Packaged? → Archived → Cleaned
//! ```
//!
//! Optional states are only entered when the matching stage is enabled.
//! A failure halts the pipeline in the state it had reached; nothing is
//! rolled back, except that the temporary root is always removed.

use crate::{
    release::{
        ArchiveArtifact, ArchiveBuilder, Error, Result,
        compiler::{Backend, BuildResult},
        docs::DocumentationDispatcher,
        matrix::{BuildMatrix, BuildMatrixExecutor, install_config},
        package::{DebianPackager, PackageArtifact, PackagePayload},
        settings::{Architecture, Platform, ReleaseDescriptor, ReleaseLayout},
        stamp, tool_detection,
        utils::fs,
    },
    source::{SourceProvider, find_sources},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the JSON report written into the build directory.
pub const REPORT_FILE: &str = "release-report.json";

/// Pipeline states, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Init,
    TreePrepared,
    VersionStamped,
    DocsBuilt,
    BinariesBuilt,
    Packaged,
    Archived,
    Cleaned,
}

/// Removes the temporary root when dropped.
struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// Summary of a finished run, serialized to [`REPORT_FILE`].
#[derive(Clone, Debug, Serialize)]
pub struct ReleaseReport {
    pub version: String,
    pub destination: PathBuf,
    /// States entered, in order.
    pub stages: Vec<Stage>,
    pub binaries: Vec<BuildResult>,
    pub pdf: Option<PathBuf>,
    pub packages: Vec<PackageArtifact>,
    pub archives: Vec<ArchiveArtifact>,
}

/// Top-level release sequencer.
///
/// # Examples
///
/// ```no_run
/// use dil_release::release::{DescriptorBuilder, ReleasePipeline, Stages, Version, ArchiveFormat};
///
/// # async fn example() -> dil_release::release::Result<()> {
/// let descriptor = DescriptorBuilder::new()
///     .version(Version::parse("1.042")?)
///     .build_dir("build")
///     .stages(Stages {
///         archives: vec![ArchiveFormat::TarGz],
///         ..Default::default()
///     })
///     .build()?;
///
/// let mut pipeline = ReleasePipeline::new(descriptor);
/// let report = pipeline.run().await?;
/// for archive in &report.archives {
///     println!("{} {}", archive.sha256, archive.path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReleasePipeline {
    descriptor: ReleaseDescriptor,
    backend: Backend,
    stage: Stage,
    history: Vec<Stage>,
}

impl ReleasePipeline {
    pub fn new(descriptor: ReleaseDescriptor) -> Self {
        let backend = Backend::from_selection(descriptor.compiler());
        Self {
            descriptor,
            backend,
            stage: Stage::Init,
            history: vec![Stage::Init],
        }
    }

    pub fn descriptor(&self) -> &ReleaseDescriptor {
        &self.descriptor
    }

    /// Last state reached. After a failure this is where the run halted.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, stage: Stage) {
        log::debug!("{:?} → {:?}", self.stage, stage);
        self.stage = stage;
        self.history.push(stage);
    }

    /// Resolves every external tool the enabled stages need.
    ///
    /// Runs before anything is mutated; a missing tool is a configuration
    /// error.
    pub fn check_tools(&self) -> Result<()> {
        let d = &self.descriptor;
        let stages = d.stages();

        SourceProvider::new(d.source()).validate()?;

        let needs_compiler =
            stages.binaries || (stages.keeps_docs() && !d.doc_generator().is_file());
        if needs_compiler {
            require(&d.compiler().executable)?;
        }
        if stages.pdf {
            require(d.pdf_converter())?;
        }
        if stages.deb {
            if !d.platforms().contains(&Platform::Linux) {
                return Err(Error::Config(
                    "--deb needs Linux binaries, which this host does not build".into(),
                ));
            }
            require(d.packaging_tool())?;
        }
        for format in &stages.archives {
            if let Some(tool) = format.required_tool() {
                require(Path::new(tool))?;
            }
        }
        Ok(())
    }

    /// Runs the whole pipeline.
    pub async fn run(&mut self) -> Result<ReleaseReport> {
        self.check_tools()?;

        let layout = self.descriptor.layout();
        let temp_root = self.descriptor.temporary_root().to_path_buf();
        let _temp_guard = TempDirGuard::new(&temp_root);

        self.prepare_tree(&layout).await?;
        self.advance(Stage::TreePrepared);

        let sources = find_sources(&layout.src()).await?;
        stamp::update_version(&layout.version_source(), self.descriptor.version()).await?;
        stamp::write_version_file(&layout.version_marker(), self.descriptor.version()).await?;
        self.advance(Stage::VersionStamped);

        let mut pdf = None;
        if self.descriptor.stages().keeps_docs() {
            pdf = self.build_docs(&sources).await?;
            self.advance(Stage::DocsBuilt);
        }

        let mut binaries = Vec::new();
        if self.descriptor.stages().binaries {
            binaries = self.build_binaries(&layout, &sources).await?;
            self.advance(Stage::BinariesBuilt);
        }

        let mut packages = Vec::new();
        if self.descriptor.stages().deb {
            packages.push(self.build_package(&layout, &binaries).await?);
            self.advance(Stage::Packaged);
        }

        if !self.descriptor.stages().keeps_docs() {
            fs::remove_dir_all(&layout.doc()).await?;
        }
        fs::remove_dir_all(&temp_root).await?;

        let archives = ArchiveBuilder::new(layout.root())?
            .build_all(&self.descriptor.stages().archives)
            .await?;
        self.advance(Stage::Archived);

        self.advance(Stage::Cleaned);
        let report = ReleaseReport {
            version: self.descriptor.version().to_string(),
            destination: layout.root().to_path_buf(),
            stages: self.history.clone(),
            binaries,
            pdf,
            packages,
            archives,
        };
        self.write_report(&report).await?;

        log::info!("Done!");
        Ok(report)
    }

    async fn prepare_tree(&self, layout: &ReleaseLayout) -> Result<()> {
        let d = &self.descriptor;
        fs::create_dir_all(d.build_dir(), false).await?;

        fs::remove_dir_all(layout.root()).await?;
        SourceProvider::new(d.source()).acquire(layout.root()).await?;

        for dir in layout.doc_dirs() {
            fs::create_dir_all(&dir, false).await?;
        }
        fs::create_dir_all(d.temporary_root(), true).await?;

        log::info!("***** Copying files *****");
        fs::copy_file(&layout.html_css(), &layout.doc_htmlsrc().join("html.css")).await?;
        fs::copy_file(&layout.kandil_style(), &layout.doc_css().join("style.css")).await?;
        for script in fs::glob_files(&layout.kandil_js(), "*.js")? {
            if let Some(name) = script.file_name() {
                fs::copy_file(&script, &layout.doc_js().join(name)).await?;
            }
        }
        fs::copy_dir_files(&layout.kandil_img(), &layout.doc_img()).await?;
        Ok(())
    }

    async fn build_docs(&self, sources: &[PathBuf]) -> Result<Option<PathBuf>> {
        let docs = DocumentationDispatcher::new(&self.descriptor);
        let generator = docs.ensure_generator(&self.backend, sources).await?;
        docs.generate_html(&generator, sources).await?;

        if self.descriptor.stages().pdf {
            return Ok(Some(docs.write_pdf().await?));
        }
        Ok(None)
    }

    async fn build_binaries(
        &self,
        layout: &ReleaseLayout,
        sources: &[PathBuf],
    ) -> Result<Vec<BuildResult>> {
        let d = &self.descriptor;
        let matrix = BuildMatrix::new(
            d.platforms(),
            d.product_name(),
            d.stages().debug_symbols,
        );
        let results = BuildMatrixExecutor::new(&self.backend, matrix)
            .run(layout, sources)
            .await?;
        install_config(&layout.config_file(d.product_name()), &results).await?;
        Ok(results)
    }

    async fn build_package(
        &self,
        layout: &ReleaseLayout,
        binaries: &[BuildResult],
    ) -> Result<PackageArtifact> {
        let d = &self.descriptor;
        let payload = PackagePayload {
            binaries: binaries
                .iter()
                .filter(|r| r.target().platform() == Platform::Linux && r.target().is_release())
                .filter_map(|r| r.binary_path().map(Path::to_path_buf))
                .collect(),
            config_file: layout.config_file(d.product_name()),
        };
        if payload.binaries.is_empty() {
            return Err(Error::Packaging("no Linux release binaries were built".into()));
        }

        let artifact = DebianPackager::new(d)
            .bundle_project(
                Architecture::X86.debian_label(),
                d.deb_revision(),
                d.package_root(),
                &payload,
                d.build_dir(),
            )
            .await?;
        fs::remove_dir_all(d.package_root()).await?;
        Ok(artifact)
    }

    async fn write_report(&self, report: &ReleaseReport) -> Result<()> {
        let path = self.descriptor.build_dir().join(REPORT_FILE);
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|error| Error::Fs {
                context: "writing release report",
                path,
                error,
            })
    }
}

fn require(program: &Path) -> Result<PathBuf> {
    tool_detection::locate(program)
        .ok_or_else(|| Error::ToolNotFound(program.display().to_string()))
}
