//! File system utilities for assembling release trees.
//!
//! Provides idempotent directory handling, file copies with automatic
//! parent creation, and symlink-preserving tree copies.

use crate::release::{Error, Result, error::ErrorExt};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            error,
        }),
    }
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}

/// Copies every regular file directly inside `from` into `to`.
///
/// Subdirectories are not descended into. Returns the copied destinations.
pub async fn copy_dir_files(from: &Path, to: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(from)
        .await
        .fs_context("reading directory", from)?;
    let mut sources = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .fs_context("reading directory", from)?
    {
        if entry
            .file_type()
            .await
            .fs_context("reading file type", entry.path())?
            .is_file()
        {
            sources.push(entry.path());
        }
    }
    sources.sort();

    let mut copied = Vec::with_capacity(sources.len());
    for src in sources {
        let Some(name) = src.file_name() else { continue };
        let dst = to.join(name);
        copy_file(&src, &dst).await?;
        copied.push(dst);
    }
    Ok(copied)
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks on platforms that support them.
/// Fails if the source path is not a directory or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a Directory")));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("reading symlink", entry.path())?;
                if entry.path().is_dir() {
                    symlink_dir(&target, &dest_path)
                } else {
                    symlink_file(&target, &dest_path)
                }
                .fs_context("creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path).fs_context("copying file", &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {e}")))?
}

/// Files directly inside `dir` matching the glob `pattern`, sorted.
pub fn glob_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry.map_err(|e| Error::Fs {
            context: "listing directory",
            path: e.path().to_path_buf(),
            error: e.into(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sets unix permission bits. No-op on other hosts.
#[cfg(unix)]
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .fs_context("setting permissions", path)
}

/// Sets unix permission bits. No-op on other hosts.
#[cfg(not(unix))]
pub async fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_dir_all_erases_stale_content() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale"), "x").unwrap();

        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("stale").exists());
    }

    #[tokio::test]
    async fn remove_missing_dir_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        remove_dir_all(&tmp.path().join("nope")).await.unwrap();
    }

    #[tokio::test]
    async fn copy_dir_files_is_flat() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("b.js"), "b").unwrap();
        std::fs::write(src.join("a.js"), "a").unwrap();
        std::fs::write(src.join("nested/c.js"), "c").unwrap();

        let dst = tmp.path().join("dst");
        let copied = copy_dir_files(&src, &dst).await.unwrap();
        assert_eq!(copied, [dst.join("a.js"), dst.join("b.js")]);
        assert!(!dst.join("nested").exists());
    }

    #[tokio::test]
    async fn copy_dir_recurses() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("x/y")).unwrap();
        std::fs::write(src.join("x/y/z.d"), "module z;").unwrap();

        let dst = tmp.path().join("out/copy");
        copy_dir(&src, &dst).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dst.join("x/y/z.d")).unwrap(),
            "module z;"
        );
    }

    #[tokio::test]
    async fn copy_file_rejects_directories() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(copy_file(tmp.path(), &tmp.path().join("x")).await.is_err());
    }
}
