//! Build matrix dimensions: platform, architecture, configuration and
//! language variant.

use serde::Serialize;
use std::fmt;

/// Operating system a binary is built for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux ELF binaries.
    Linux,
    /// Windows PE binaries (`.exe`).
    Windows,
}

impl Platform {
    /// The platform of the running host.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// Directory name under the release root, e.g. `linux`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }

    /// Executable file extension including the dot, empty on Linux.
    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Linux => "",
            Platform::Windows => ".exe",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
        };
        f.write_str(name)
    }
}

/// CPU architecture of a build cell.
///
/// Only [`Architecture::X86`] cells are populated; 64-bit builds are reserved
/// until cross-compiling to 64-bit is supported.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// 32-bit x86.
    X86,
    /// 64-bit x86-64.
    X64,
}

impl Architecture {
    /// All architectures in matrix order.
    pub const ALL: [Architecture; 2] = [Architecture::X86, Architecture::X64];

    /// Pointer width, used for directory names (`bin32`) and `-m32`.
    pub fn bits(self) -> u8 {
        match self {
            Architecture::X86 => 32,
            Architecture::X64 => 64,
        }
    }

    /// Whether the matrix builds binaries for this architecture.
    pub fn is_populated(self) -> bool {
        matches!(self, Architecture::X86)
    }

    /// Architecture label used in Debian control files.
    pub fn debian_label(self) -> &'static str {
        match self {
            Architecture::X86 => "i386",
            Architecture::X64 => "amd64",
        }
    }
}

/// Build configuration of a cell.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    /// Unoptimized, with debug symbols.
    Debug,
    /// Optimized release build.
    Release,
}

impl Configuration {
    /// All configurations in matrix order.
    pub const ALL: [Configuration; 2] = [Configuration::Debug, Configuration::Release];
}

/// Language version the compiler front end is built for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageVariant {
    /// D version 1.
    V1,
    /// D version 2.
    V2,
}

impl LanguageVariant {
    /// All variants in matrix order.
    pub const ALL: [LanguageVariant; 2] = [LanguageVariant::V1, LanguageVariant::V2];

    /// Version identifier passed to the compiler (`-version=D1`).
    pub fn version_ident(self) -> &'static str {
        match self {
            LanguageVariant::V1 => "D1",
            LanguageVariant::V2 => "D2",
        }
    }

    /// Numeric suffix used in binary names (`dil1`, `dil2`).
    pub fn number(self) -> u8 {
        match self {
            LanguageVariant::V1 => 1,
            LanguageVariant::V2 => 2,
        }
    }
}
