//! The LLVM-based D compiler.

use super::{BuildTarget, CompilerBackend, display_sources};
use std::path::{Path, PathBuf};

/// Invokes `ldc2`.
#[derive(Clone, Debug)]
pub struct Ldc {
    executable: PathBuf,
}

impl Ldc {
    pub fn new(executable: impl AsRef<Path>) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
        }
    }
}

impl CompilerBackend for Ldc {
    fn name(&self) -> &str {
        "ldc"
    }

    fn executable(&self) -> &Path {
        &self.executable
    }

    fn arguments(&self, target: &BuildTarget, sources: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            format!("-of={}", target.display_output_path()),
            format!("-d-version={}", target.variant().version_ident()),
            format!("-m{}", target.architecture().bits()),
        ];
        if target.is_release() {
            args.push("-release".into());
            args.push("-O3".into());
            args.push("-enable-inlining=false".into());
        }
        if target.include_debug_info() {
            args.push("-g".into());
        }
        args.extend(target.extra_link_args().iter().map(|a| format!("-L={a}")));
        args.extend(display_sources(target, sources));
        args
    }
}
