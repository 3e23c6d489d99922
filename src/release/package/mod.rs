//! Debian package (.deb) creation.
//!
//! Assembles a package skeleton from the built binaries, computes the
//! payload manifest and seals the skeleton with `dpkg-deb`.
//!
//! # Process
//!
//! 1. Create `usr/bin`, `etc` and `DEBIAN` in a fresh skeleton
//! 2. Copy binaries and the configuration file
//! 3. Discover payload files carrying the product prefix
//! 4. Compute installed size and MD5 checksums
//! 5. Render `DEBIAN/control` from [`template::CONTROL_TEMPLATE`]
//! 6. Write `DEBIAN/control` and `DEBIAN/md5sums`
//! 7. Run `dpkg-deb --build`
//!
//! A failed seal leaves the skeleton in place for inspection.

mod template;

use crate::release::{
    Error, Result,
    checksum::{ChecksumEntry, ChecksumManifestBuilder},
    error::ErrorExt,
    process::run_tool,
    settings::ReleaseDescriptor,
    tool_detection,
    utils::fs,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use template::CONTROL_TEMPLATE;

/// Files that go into a package.
#[derive(Clone, Debug)]
pub struct PackagePayload {
    /// Executables installed to `/usr/bin`.
    pub binaries: Vec<PathBuf>,
    /// Configuration file installed to `/etc`.
    pub config_file: PathBuf,
}

/// Metadata of one assembled package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    /// Debian version, `<release version>-<revision>`.
    pub version: String,
    /// Debian architecture label, e.g. `amd64`.
    pub architecture: String,
    /// Sum of the sizes of the files in `file_checksums`.
    pub installed_size_bytes: u64,
    /// Payload checksums in discovery order.
    pub file_checksums: Vec<ChecksumEntry>,
}

impl PackageManifest {
    /// `Installed-Size` value: whole kibibytes.
    pub fn installed_size_kib(&self) -> u64 {
        self.installed_size_bytes / 1024
    }
}

/// A skeleton with metadata written, ready to be sealed.
#[derive(Clone, Debug)]
pub struct AssembledPackage {
    /// Root of the package tree (contains `DEBIAN/`).
    pub skeleton: PathBuf,
    /// File name of the sealed package.
    pub file_name: String,
    /// Rendered `DEBIAN/control`.
    pub control: String,
    pub manifest: PackageManifest,
}

/// A sealed package.
#[derive(Clone, Debug, Serialize)]
pub struct PackageArtifact {
    pub path: PathBuf,
    pub manifest: PackageManifest,
}

/// Builds Debian packages for a release.
#[derive(Debug)]
pub struct DebianPackager<'a> {
    descriptor: &'a ReleaseDescriptor,
}

impl<'a> DebianPackager<'a> {
    pub fn new(descriptor: &'a ReleaseDescriptor) -> Self {
        Self { descriptor }
    }

    /// `<product>_<version>-<revision>_<arch>.deb`
    pub fn package_file_name(&self, arch: &str, revision: u32) -> String {
        format!(
            "{}_{}-{}_{}.deb",
            self.descriptor.product_name(),
            self.descriptor.version(),
            revision,
            arch
        )
    }

    /// Assembles and seals a package, writing it into `out_dir`.
    pub async fn bundle_project(
        &self,
        arch: &str,
        revision: u32,
        work_dir: &Path,
        payload: &PackagePayload,
        out_dir: &Path,
    ) -> Result<PackageArtifact> {
        log::info!(
            "Building Debian package for {} ({})",
            self.descriptor.product_name(),
            arch
        );
        let assembled = self.assemble(arch, revision, work_dir, payload).await?;
        let path = self.seal(&assembled, out_dir).await?;
        log::info!("✓ Created Debian package: {}", path.display());
        Ok(PackageArtifact {
            path,
            manifest: assembled.manifest,
        })
    }

    /// Steps 1 to 6: skeleton, payload, manifest and metadata files.
    pub async fn assemble(
        &self,
        arch: &str,
        revision: u32,
        work_dir: &Path,
        payload: &PackagePayload,
    ) -> Result<AssembledPackage> {
        let skeleton = work_dir.join("debian");
        fs::create_dir_all(&skeleton, true).await?;

        let bin_dir = skeleton.join("usr").join("bin");
        let etc_dir = skeleton.join("etc");
        let debian_dir = skeleton.join("DEBIAN");
        for dir in [&bin_dir, &etc_dir, &debian_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .fs_context("creating package skeleton", dir)?;
        }

        for binary in &payload.binaries {
            let dst = bin_dir.join(file_name(binary)?);
            fs::copy_file(binary, &dst).await?;
            fs::set_mode(&dst, 0o755).await?;
        }
        let conf_dst = etc_dir.join(file_name(&payload.config_file)?);
        fs::copy_file(&payload.config_file, &conf_dst).await?;
        fs::set_mode(&conf_dst, 0o644).await?;

        let files = discover_payload(&skeleton, self.descriptor.product_name()).await?;
        let checksums = ChecksumManifestBuilder::new(&skeleton).build(&files).await?;
        let md5sums = checksums.render_md5sums();

        let manifest = PackageManifest {
            version: format!("{}-{}", self.descriptor.version(), revision),
            architecture: arch.to_string(),
            installed_size_bytes: checksums.total_size,
            file_checksums: checksums.entries,
        };

        let control = self.render_control(&manifest)?;

        let control_path = debian_dir.join("control");
        tokio::fs::write(&control_path, &control)
            .await
            .fs_context("writing control file", &control_path)?;
        let md5sums_path = debian_dir.join("md5sums");
        tokio::fs::write(&md5sums_path, md5sums)
            .await
            .fs_context("writing md5sums", &md5sums_path)?;

        Ok(AssembledPackage {
            skeleton,
            file_name: self.package_file_name(arch, revision),
            control,
            manifest,
        })
    }

    /// Step 7: seals the skeleton with the packaging tool.
    pub async fn seal(&self, assembled: &AssembledPackage, out_dir: &Path) -> Result<PathBuf> {
        let tool = self.descriptor.packaging_tool();
        let tool = tool_detection::locate(tool).ok_or_else(|| {
            Error::Packaging(format!(
                "'{}' is not available; the skeleton is kept at {}",
                tool.display(),
                assembled.skeleton.display()
            ))
        })?;

        tokio::fs::create_dir_all(out_dir)
            .await
            .fs_context("creating package output directory", out_dir)?;
        let out = out_dir.join(&assembled.file_name);

        let args = [
            "--root-owner-group".as_ref(),
            "--build".as_ref(),
            assembled.skeleton.as_os_str(),
            out.as_os_str(),
        ];
        run_tool(&tool, args, None).await.map_err(|e| match e {
            Error::ToolInvocation {
                command,
                status,
                diagnostics,
            } => Error::Packaging(format!(
                "`{command}` failed ({status}); the skeleton is kept at {}\n{diagnostics}",
                assembled.skeleton.display()
            )),
            other => other,
        })?;

        Ok(out)
    }

    fn render_control(&self, manifest: &PackageManifest) -> Result<String> {
        let package = self.descriptor.package();

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string("control", CONTROL_TEMPLATE)
            .map_err(|e| Error::GenericError(format!("failed to register control template: {e}")))?;

        let mut data = BTreeMap::new();
        data.insert("package", package.product_name.clone());
        data.insert("version", manifest.version.clone());
        data.insert("section", package.section.clone());
        data.insert("priority", package.priority.clone());
        data.insert("arch", manifest.architecture.clone());
        data.insert("depends", package.depends.join(", "));
        data.insert("provides", package.provides.join(", "));
        data.insert("installed_size", manifest.installed_size_kib().to_string());
        data.insert("maintainer", package.maintainer.clone());
        data.insert("bugs", package.bugs.clone());
        data.insert("homepage", package.homepage.clone());
        data.insert("short_description", package.short_description.clone());
        data.insert("long_description", package.long_description.clone());

        handlebars
            .render("control", &data)
            .map_err(|e| Error::GenericError(format!("failed to render control file: {e}")))
    }
}

fn file_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name()
        .ok_or_else(|| Error::GenericError(format!("{} has no file name", path.display())))
}

/// Files below `skeleton` whose name starts with `prefix`, sorted by path.
/// The `DEBIAN` metadata directory is never part of the payload.
async fn discover_payload(skeleton: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let skeleton = skeleton.to_path_buf();
    let prefix = prefix.to_string();

    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        let walker = walkdir::WalkDir::new(&skeleton)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() != 1 || e.file_name() != "DEBIAN");
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.file_name().to_string_lossy().starts_with(&prefix)
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| Error::GenericError(format!("payload discovery task panicked: {e}")))?
}
