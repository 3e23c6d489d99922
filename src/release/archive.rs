//! Release archives.
//!
//! Every archive holds the release tree under a single top-level directory
//! named after it (`dil.1.042/...`) and is written next to that tree.
//! `tar.gz` and `zip` are produced in-process; `tar.bz2` and `7z` are handed
//! to the external `tar` and `7z` tools.

use crate::release::{
    Error, Result,
    checksum::calculate_sha256,
    error::ErrorExt,
    process::run_tool,
    settings::ArchiveFormat,
    tool_detection,
};
use flate2::{Compression, write::GzEncoder};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// A finished archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveArtifact {
    pub format: ArchiveFormat,
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the archive file.
    pub sha256: String,
}

/// Writes archives of one release tree.
#[derive(Clone, Debug)]
pub struct ArchiveBuilder {
    root: PathBuf,
    out_dir: PathBuf,
    name: String,
}

impl ArchiveBuilder {
    /// Archives `root` into its parent directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let name = root
            .file_name()
            .ok_or_else(|| Error::GenericError(format!("{} has no file name", root.display())))?
            .to_string_lossy()
            .into_owned();
        let out_dir = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            root,
            out_dir,
            name,
        })
    }

    /// Path of the archive for `format`.
    pub fn archive_path(&self, format: ArchiveFormat) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", self.name, format.extension()))
    }

    /// Writes one archive per format, in order.
    pub async fn build_all(&self, formats: &[ArchiveFormat]) -> Result<Vec<ArchiveArtifact>> {
        let mut artifacts = Vec::with_capacity(formats.len());
        for &format in formats {
            artifacts.push(self.build(format).await?);
        }
        Ok(artifacts)
    }

    /// Writes the archive for `format`, replacing an existing one.
    pub async fn build(&self, format: ArchiveFormat) -> Result<ArchiveArtifact> {
        let path = self.archive_path(format);
        log::info!("Creating {}", path.display());

        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::debug!("Replaced existing {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                return Err(Error::Fs {
                    context: "removing old archive",
                    path,
                    error,
                });
            }
        }

        match format {
            ArchiveFormat::TarGz => self.blocking(write_tar_gz, &path).await?,
            ArchiveFormat::Zip => self.blocking(write_zip, &path).await?,
            ArchiveFormat::TarBz2 => {
                self.external(format, ["-cjf".as_ref(), path.as_os_str(), self.name.as_ref()])
                    .await?
            }
            ArchiveFormat::SevenZip => {
                self.external(format, ["a".as_ref(), path.as_os_str(), self.name.as_ref()])
                    .await?
            }
        }

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading archive metadata", &path)?
            .len();
        let sha256 = calculate_sha256(&path).await?;
        log::info!("✓ {} ({} bytes)", path.display(), size);

        Ok(ArchiveArtifact {
            format,
            path,
            size,
            sha256,
        })
    }

    async fn blocking(
        &self,
        write: fn(&Path, &str, &Path) -> Result<()>,
        out: &Path,
    ) -> Result<()> {
        let root = self.root.clone();
        let name = self.name.clone();
        let out = out.to_path_buf();
        tokio::task::spawn_blocking(move || write(&root, &name, &out))
            .await
            .map_err(|e| Error::GenericError(format!("archive task panicked: {e}")))?
    }

    async fn external<'a, const N: usize>(
        &self,
        format: ArchiveFormat,
        args: [&'a std::ffi::OsStr; N],
    ) -> Result<()> {
        let tool = format.required_tool().unwrap_or_default();
        let program = tool_detection::locate(Path::new(tool))
            .ok_or_else(|| Error::ToolNotFound(tool.to_string()))?;
        // Paths inside the archive are relative to the build directory.
        run_tool(&program, args, Some(&self.out_dir)).await?;
        Ok(())
    }
}

fn write_tar_gz(root: &Path, name: &str, out: &Path) -> Result<()> {
    let file = File::create(out).fs_context("creating archive", out)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder
        .append_dir_all(name, root)
        .fs_context("adding tree to archive", root)?;
    let encoder = builder
        .into_inner()
        .fs_context("finishing tar stream", out)?;
    encoder
        .finish()
        .fs_context("finishing gzip stream", out)?
        .flush()
        .fs_context("writing archive", out)
}

fn write_zip(root: &Path, name: &str, out: &Path) -> Result<()> {
    let file = File::create(out).fs_context("creating archive", out)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(root)?;
        let mut entry_name = name.to_string();
        for part in rel.components() {
            entry_name.push('/');
            entry_name.push_str(&part.as_os_str().to_string_lossy());
        }

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{entry_name}/"), options)?;
        } else if entry.file_type().is_file() {
            let options = options.unix_permissions(file_mode(entry.path()));
            zip.start_file(entry_name, options)?;
            let mut src = File::open(entry.path()).fs_context("opening file", entry.path())?;
            std::io::copy(&mut src, &mut zip).fs_context("compressing file", entry.path())?;
        }
    }

    zip.finish()?
        .flush()
        .fs_context("writing archive", out)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    0o644
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;

    fn release_tree(dir: &Path) -> PathBuf {
        let root = dir.join("dil.1.042");
        std::fs::create_dir_all(root.join("src/dil")).unwrap();
        std::fs::write(root.join("VERSION"), "1.042\n").unwrap();
        std::fs::write(root.join("src/dil/Version.d"), "module dil.Version;\n").unwrap();
        root
    }

    #[tokio::test]
    async fn tar_gz_has_single_top_level_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = release_tree(tmp.path());

        let artifact = ArchiveBuilder::new(&root)
            .unwrap()
            .build(ArchiveFormat::TarGz)
            .await
            .unwrap();
        assert_eq!(artifact.path, tmp.path().join("dil.1.042.tar.gz"));
        assert_eq!(artifact.sha256.len(), 64);

        let file = File::open(&artifact.path).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| n.starts_with("dil.1.042")));
        assert!(names.iter().any(|n| n == "dil.1.042/src/dil/Version.d"));
    }

    #[tokio::test]
    async fn zip_entries_use_forward_slashes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = release_tree(tmp.path());

        let artifact = ArchiveBuilder::new(&root)
            .unwrap()
            .build(ArchiveFormat::Zip)
            .await
            .unwrap();

        let archive = zip::ZipArchive::new(File::open(&artifact.path).unwrap()).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"dil.1.042/VERSION".to_string()));
        assert!(names.contains(&"dil.1.042/src/dil/Version.d".to_string()));
        assert!(names.iter().all(|n| !n.contains('\\')));
    }

    #[tokio::test]
    async fn rebuilding_replaces_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let root = release_tree(tmp.path());
        let builder = ArchiveBuilder::new(&root).unwrap();

        let first = builder.build(ArchiveFormat::TarGz).await.unwrap();
        std::fs::write(root.join("VERSION"), "1.043\n").unwrap();
        let second = builder.build(ArchiveFormat::TarGz).await.unwrap();
        assert_ne!(first.sha256, second.sha256);
    }
}
