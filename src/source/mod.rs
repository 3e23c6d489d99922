//! Source tree acquisition
//!
//! Fills the release root either from a local directory or from a clean
//! `git archive` of `HEAD`.

use crate::release::{
    Error, Result, SourceSpec,
    error::ErrorExt,
    process::run_tool,
    tool_detection,
    utils::fs,
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Name of the intermediate tarball written by `git archive`.
const SNAPSHOT_TAR: &str = ".release-snapshot.tar";

pub struct SourceProvider<'a> {
    spec: &'a SourceSpec,
}

impl<'a> SourceProvider<'a> {
    pub fn new(spec: &'a SourceSpec) -> Self {
        Self { spec }
    }

    /// Checks that the source can be acquired. Touches nothing.
    pub fn validate(&self) -> Result<()> {
        match self.spec {
            SourceSpec::Directory(path) => {
                if !path.is_dir() {
                    return Err(Error::Config(format!(
                        "the given SRC path ({}) doesn't exist",
                        path.display()
                    )));
                }
            }
            SourceSpec::GitCheckout { repository, .. } => {
                if tool_detection::locate(Path::new("git")).is_none() {
                    return Err(Error::Config(
                        "'git' is not in your PATH; specify --src instead".into(),
                    ));
                }
                if !repository.is_dir() {
                    return Err(Error::Config(format!(
                        "repository {} doesn't exist",
                        repository.display()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Populates `dest`, which must not exist yet.
    pub async fn acquire(&self, dest: &Path) -> Result<()> {
        match self.spec {
            SourceSpec::Directory(src) => {
                log::info!("Copying {} to {}", src.display(), dest.display());
                fs::copy_dir(src, dest).await
            }
            SourceSpec::GitCheckout {
                repository,
                copy_modified,
            } => {
                export_head(repository, dest).await?;
                if *copy_modified {
                    copy_modified_files(repository, dest).await?;
                }
                Ok(())
            }
        }
    }
}

async fn export_head(repository: &Path, dest: &Path) -> Result<()> {
    let git = tool_detection::locate(Path::new("git"))
        .ok_or_else(|| Error::ToolNotFound("git".into()))?;

    fs::create_dir_all(dest, false).await?;
    let dest = dest
        .absolutize()
        .fs_context("resolving destination", dest)?
        .into_owned();
    let tarball = dest.join(SNAPSHOT_TAR);

    log::info!("Exporting HEAD of {}", repository.display());
    run_tool(
        &git,
        [
            "archive".as_ref(),
            "--format=tar".as_ref(),
            "-o".as_ref(),
            tarball.as_os_str(),
            "HEAD".as_ref(),
        ],
        Some(repository),
    )
    .await?;

    let unpack_dest = dest.clone();
    let unpack_tar = tarball.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::open(&unpack_tar).fs_context("opening snapshot", &unpack_tar)?;
        let mut archive = tar::Archive::new(std::io::BufReader::new(file));
        archive
            .unpack(&unpack_dest)
            .fs_context("unpacking snapshot", &unpack_dest)
    })
    .await
    .map_err(|e| Error::GenericError(format!("snapshot unpack task panicked: {e}")))??;

    tokio::fs::remove_file(&tarball)
        .await
        .fs_context("removing snapshot", &tarball)
}

/// Copies files reported by `git ls-files -m` over the exported snapshot.
async fn copy_modified_files(repository: &Path, dest: &Path) -> Result<()> {
    let git = tool_detection::locate(Path::new("git"))
        .ok_or_else(|| Error::ToolNotFound("git".into()))?;
    let output = run_tool(&git, ["ls-files", "-m"], Some(repository)).await?;

    for file in output.stdout.lines().filter(|l| !l.is_empty()) {
        let src = repository.join(file);
        if !src.is_file() {
            log::warn!("Skipping modified file {}: deleted in the working tree", file);
            continue;
        }
        log::debug!("Copying modified file {}", file);
        fs::copy_file(&src, &dest.join(file)).await?;
    }
    Ok(())
}

/// All D source files below `src`, sorted by path.
pub async fn find_sources(src: &Path) -> Result<Vec<PathBuf>> {
    let src = src.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&src).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "d")
            {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    })
    .await
    .map_err(|e| Error::GenericError(format!("source discovery task panicked: {e}")))?
}
