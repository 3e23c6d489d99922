//! The reference D compiler.

use super::{BuildTarget, CompilerBackend, display_sources};
use std::path::{Path, PathBuf};

/// Invokes `dmd`.
#[derive(Clone, Debug)]
pub struct Dmd {
    executable: PathBuf,
}

impl Dmd {
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
        }
    }
}

impl CompilerBackend for Dmd {
    fn name(&self) -> &str {
        "dmd"
    }

    fn executable(&self) -> &Path {
        &self.executable
    }

    fn arguments(&self, target: &BuildTarget, sources: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            format!("-of{}", target.display_output_path()),
            format!("-version={}", target.variant().version_ident()),
            format!("-m{}", target.architecture().bits()),
        ];
        if target.is_release() {
            // No -inline: it bloats the binaries (DMD bug 7967).
            args.push("-release".into());
            args.push("-O".into());
        }
        if target.include_debug_info() {
            args.push("-g".into());
        }
        args.extend(target.extra_link_args().iter().map(|a| format!("-L{a}")));
        args.extend(display_sources(target, sources));
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::settings::{Architecture, Configuration, LanguageVariant, Platform};

    #[test]
    fn release_build_never_inlines() {
        let target = BuildTarget::new(
            Platform::Linux,
            Architecture::X86,
            Configuration::Release,
            LanguageVariant::V1,
            Path::new("linux/bin32"),
            "dil",
        )
        .with_link_args(["-ldl"]);
        let args = Dmd::new("dmd").arguments(&target, &[PathBuf::from("src/main.d")]);
        assert_eq!(
            args,
            [
                "-oflinux/bin32/dil1",
                "-version=D1",
                "-m32",
                "-release",
                "-O",
                "-L-ldl",
                "src/main.d"
            ]
        );
        assert!(!args.iter().any(|a| a == "-inline"));
    }

    #[test]
    fn debug_build_has_symbols_only() {
        let target = BuildTarget::new(
            Platform::Linux,
            Architecture::X86,
            Configuration::Debug,
            LanguageVariant::V2,
            Path::new("bin32"),
            "dil",
        )
        .with_debug_info(true);
        let args = Dmd::new("dmd").arguments(&target, &[]);
        assert_eq!(args, ["-ofbin32/dil2_dbg", "-version=D2", "-m32", "-g"]);
    }
}
