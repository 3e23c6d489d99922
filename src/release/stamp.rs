//! Writes the release version into the source tree.

use crate::release::{Error, Result, error::ErrorExt, settings::Version};
use regex::{Captures, Regex};
use std::{path::Path, sync::LazyLock};

struct Marker {
    name: &'static str,
    pattern: LazyLock<Regex>,
}

static MAJOR: Marker = Marker {
    name: "VERSION_MAJOR",
    pattern: LazyLock::new(|| {
        Regex::new(r"(VERSION_MAJOR\s*=\s*)[\w\d]+;").expect("marker pattern is valid")
    }),
};

static MINOR: Marker = Marker {
    name: "VERSION_MINOR",
    pattern: LazyLock::new(|| {
        Regex::new(r"(VERSION_MINOR\s*=\s*)\d+;").expect("marker pattern is valid")
    }),
};

static SUFFIX: Marker = Marker {
    name: "VERSION_SUFFIX",
    pattern: LazyLock::new(|| {
        Regex::new(r#"(VERSION_SUFFIX\s*=\s*)"[^"]*";"#).expect("marker pattern is valid")
    }),
};

/// Replaces the single occurrence of `marker` with `value`.
fn replace_marker(code: &str, marker: &Marker, value: &str, path: &Path) -> Result<String> {
    if !marker.pattern.is_match(code) {
        return Err(Error::VersionMarkerMissing {
            marker: marker.name,
            path: path.to_path_buf(),
        });
    }
    Ok(marker
        .pattern
        .replacen(code, 1, |caps: &Captures<'_>| format!("{}{value};", &caps[1]))
        .into_owned())
}

/// Rewrites the version constants of a source text.
///
/// `path` is only used for error messages.
pub fn stamp_source(code: &str, version: &Version, path: &Path) -> Result<String> {
    let code = replace_marker(code, &MAJOR, &version.major().to_string(), path)?;
    let code = replace_marker(&code, &MINOR, &version.minor().to_string(), path)?;
    replace_marker(&code, &SUFFIX, &format!("\"{}\"", version.suffix()), path)
}

/// Stamps `version` into the source file at `path`.
///
/// The file is only written when all three markers were found.
pub async fn update_version(path: &Path, version: &Version) -> Result<()> {
    let code = tokio::fs::read_to_string(path)
        .await
        .fs_context("reading version source", path)?;
    let stamped = stamp_source(&code, version, path)?;
    tokio::fs::write(path, stamped)
        .await
        .fs_context("writing version source", path)?;
    log::info!("Stamped version {} into {}", version, path.display());
    Ok(())
}

/// Writes the `VERSION` marker file into the release root.
pub async fn write_version_file(dest: &Path, version: &Version) -> Result<()> {
    tokio::fs::write(dest, format!("{version}\n"))
        .await
        .fs_context("writing VERSION file", dest)
}
