//! Payload checksums.
//!
//! This module computes the MD5 manifest of a package payload (the
//! `DEBIAN/md5sums` contents plus the installed size) and SHA-256 checksums
//! of finished artifacts.

use crate::release::{Error, Result, error::ErrorExt};
use md5::Context as Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::{
    collections::HashSet,
    path::{Component, Path, PathBuf},
};
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 8192;

/// One manifest line: checksum and path relative to the package root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChecksumEntry {
    /// Lowercase hex MD5 digest.
    pub checksum: String,
    /// Path relative to the root, `/`-separated on every host.
    pub path: String,
}

/// Total size and per-file checksums of a payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChecksumManifest {
    /// Sum of the sizes of exactly the files in `entries`, in bytes.
    pub total_size: u64,
    /// One entry per input file, in input order.
    pub entries: Vec<ChecksumEntry>,
}

impl ChecksumManifest {
    /// Renders the manifest in `md5sum` output format.
    pub fn render_md5sums(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}  {}\n", e.checksum, e.path))
            .collect()
    }
}

/// Builds a [`ChecksumManifest`] for files below a root directory.
///
/// # Example
///
/// ```no_run
/// use dil_release::release::ChecksumManifestBuilder;
/// use std::path::PathBuf;
///
/// # async fn example() -> dil_release::release::Result<()> {
/// let root = PathBuf::from("build/debian");
/// let files = vec![root.join("usr/bin/dil1"), root.join("etc/dilconf.d")];
/// let manifest = ChecksumManifestBuilder::new(&root).build(&files).await?;
/// print!("{}", manifest.render_md5sums());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ChecksumManifestBuilder {
    root: PathBuf,
}

impl ChecksumManifestBuilder {
    /// Creates a builder computing paths relative to `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Hashes `files` in order.
    ///
    /// Fails without returning a partial manifest if any file is unreadable,
    /// lies outside the root, or appears twice.
    pub async fn build(&self, files: &[PathBuf]) -> Result<ChecksumManifest> {
        let mut manifest = ChecksumManifest::default();
        let mut seen = HashSet::new();

        for file in files {
            let path = self.relative_path(file)?;
            if !seen.insert(path.clone()) {
                return Err(Error::GenericError(format!(
                    "duplicate manifest entry: {path}"
                )));
            }

            let (size, checksum) = md5_file(file).await?;
            manifest.total_size += size;
            manifest.entries.push(ChecksumEntry { checksum, path });
        }

        Ok(manifest)
    }

    fn relative_path(&self, file: &Path) -> Result<String> {
        let rel = file.strip_prefix(&self.root).map_err(|_| {
            Error::GenericError(format!(
                "{} is not below {}",
                file.display(),
                self.root.display()
            ))
        })?;

        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy()),
                _ => {
                    return Err(Error::GenericError(format!(
                        "{} has a non-normal path component below {}",
                        file.display(),
                        self.root.display()
                    )));
                }
            }
        }

        if parts.is_empty() {
            return Err(Error::GenericError(format!(
                "{} is the manifest root, not a file",
                file.display()
            )));
        }
        Ok(parts.join("/"))
    }
}

/// Reads a file once, returning its size and MD5 digest.
async fn md5_file(file_path: &Path) -> Result<(u64, String)> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut size = 0u64;

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        size += n as u64;
        hasher.consume(&buffer[..n]);
    }

    Ok((size, format!("{:x}", hasher.finalize())))
}

/// Calculates the SHA-256 checksum of a single file.
///
/// Reads the file in 8KB chunks to handle large archives efficiently.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash (64 characters)
/// * `Err` - If the file cannot be read
pub async fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
