//! Build cells and their outcomes.

use crate::release::settings::{Architecture, Configuration, LanguageVariant, Platform};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How paths are rendered on a compiler command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformPathStyle {
    /// Paths are passed through unchanged.
    Posix,
    /// Executable paths use backslashes; other paths keep forward slashes.
    Windows,
}

impl PlatformPathStyle {
    /// Style for building `platform` binaries on `host`.
    pub fn for_target(platform: Platform, host: Platform) -> Self {
        if platform == Platform::Windows && host != Platform::Windows {
            PlatformPathStyle::Windows
        } else {
            PlatformPathStyle::Posix
        }
    }

    /// Renders `path` for a command line.
    pub fn to_display_path(self, path: &Path) -> String {
        let text = path.to_string_lossy();
        match self {
            PlatformPathStyle::Windows
                if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("exe")) =>
            {
                text.replace('/', "\\")
            }
            _ => text.into_owned(),
        }
    }
}

/// One cell of the build matrix.
///
/// The output path always carries `.exe` for Windows targets and no
/// extension otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    platform: Platform,
    architecture: Architecture,
    configuration: Configuration,
    variant: LanguageVariant,
    output_path: PathBuf,
    extra_link_args: Vec<String>,
    include_debug_info: bool,
    use_cross_toolchain: bool,
    path_style: PlatformPathStyle,
}

impl BuildTarget {
    /// Creates a target writing `<product><n>[_dbg][.exe]` into `output_dir`.
    pub fn new(
        platform: Platform,
        architecture: Architecture,
        configuration: Configuration,
        variant: LanguageVariant,
        output_dir: &Path,
        product: &str,
    ) -> Self {
        let debug_tag = match configuration {
            Configuration::Debug => "_dbg",
            Configuration::Release => "",
        };
        let file_name = format!(
            "{product}{}{debug_tag}{}",
            variant.number(),
            platform.exe_suffix()
        );

        Self {
            platform,
            architecture,
            configuration,
            variant,
            output_path: output_dir.join(file_name),
            extra_link_args: Vec::new(),
            include_debug_info: false,
            use_cross_toolchain: false,
            path_style: PlatformPathStyle::for_target(platform, Platform::host()),
        }
    }

    /// Sets the linker arguments, in order.
    pub fn with_link_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_link_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Writes the binary to `path` instead of the generated name.
    ///
    /// Windows targets get `.exe` appended when `path` lacks it.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        let mut path = path.into();
        let has_exe = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));
        if self.platform == Platform::Windows && !has_exe {
            let mut name = path.into_os_string();
            name.push(".exe");
            path = PathBuf::from(name);
        }
        self.output_path = path;
        self
    }

    /// Requests debug symbols.
    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.include_debug_info = enabled;
        self
    }

    /// Runs the compiler through the cross toolchain (wine). Implies the
    /// Windows path style.
    pub fn with_cross_toolchain(mut self, enabled: bool) -> Self {
        self.use_cross_toolchain = enabled;
        if enabled {
            self.path_style = PlatformPathStyle::Windows;
        }
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    pub fn variant(&self) -> LanguageVariant {
        self.variant
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn extra_link_args(&self) -> &[String] {
        &self.extra_link_args
    }

    pub fn include_debug_info(&self) -> bool {
        self.include_debug_info
    }

    pub fn use_cross_toolchain(&self) -> bool {
        self.use_cross_toolchain
    }

    pub fn path_style(&self) -> PlatformPathStyle {
        self.path_style
    }

    /// Optimized release build.
    pub fn is_release(&self) -> bool {
        self.configuration == Configuration::Release
    }

    /// Output path rendered for the compiler command line.
    pub fn display_output_path(&self) -> String {
        self.path_style.to_display_path(&self.output_path)
    }
}

/// Outcome of building one [`BuildTarget`].
#[derive(Clone, Debug, Serialize)]
pub struct BuildResult {
    target: BuildTarget,
    success: bool,
    binary_path: Option<PathBuf>,
    diagnostics: String,
}

impl BuildResult {
    /// The compiler succeeded and wrote the target's output path.
    pub fn succeeded(target: BuildTarget, diagnostics: String) -> Self {
        let binary_path = Some(target.output_path.clone());
        Self {
            target,
            success: true,
            binary_path,
            diagnostics,
        }
    }

    /// The compiler failed; no binary is recorded.
    pub fn failed(target: BuildTarget, diagnostics: String) -> Self {
        Self {
            target,
            success: false,
            binary_path: None,
            diagnostics,
        }
    }

    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Path of the produced binary, present iff the build succeeded.
    pub fn binary_path(&self) -> Option<&Path> {
        self.binary_path.as_deref()
    }

    /// Captured compiler output.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }
}
