//! External tool detection and availability checking.
//!
//! This module locates the external programs the pipeline shells out to and
//! decides which platforms the build matrix can target on this host.

use crate::release::settings::Platform;
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// Path of `wine`, needed to build Windows binaries on a non-Windows host.
///
/// Cached result to avoid repeated subprocess calls during the build.
pub static WINE: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    if cfg!(windows) {
        return None;
    }
    match which::which("wine") {
        Ok(path) => match std::process::Command::new(&path).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::info!("✓ wine available: {}", version.trim());
                Some(path)
            }
            Ok(output) => {
                log::warn!(
                    "wine found at {} but --version check failed (exit code: {:?}). \
                         Windows binaries will be skipped. \
                         Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "wine found at {} but failed to execute: {}. \
                         Windows binaries will be skipped.",
                    path.display(),
                    e
                );
                None
            }
        },
        Err(e) => {
            log::debug!("wine not found in PATH: {}", e);
            None
        }
    }
});

/// What the host can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Platform of the running host.
    pub native: Platform,
    /// Whether a toolchain for the other platform is available.
    pub cross_toolchain: bool,
}

impl HostCapabilities {
    /// Probes the running host.
    pub fn detect() -> Self {
        let native = Platform::host();
        let cross_toolchain = native == Platform::Linux && WINE.is_some();
        Self {
            native,
            cross_toolchain,
        }
    }

    /// Platforms the build matrix is enabled for, in build order.
    ///
    /// The native platform is always enabled. Windows binaries can be
    /// cross-built from Linux through wine; the reverse is not supported.
    pub fn enabled_platforms(self) -> Vec<Platform> {
        match self.native {
            Platform::Windows => vec![Platform::Windows],
            Platform::Linux if self.cross_toolchain => vec![Platform::Linux, Platform::Windows],
            Platform::Linux => {
                log::warn!("cannot build Windows binaries: 'wine' is not in PATH");
                vec![Platform::Linux]
            }
        }
    }
}

/// Platforms enabled on the running host.
pub fn enabled_platforms() -> Vec<Platform> {
    HostCapabilities::detect().enabled_platforms()
}

/// Resolves an executable given either as a path or as a name in `PATH`.
pub fn locate(program: &Path) -> Option<PathBuf> {
    if program.is_file() {
        return Some(program.to_path_buf());
    }
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program.display(), path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program.display(), e);
            None
        }
    }
}
