//! Compiler backends.
//!
//! A [`CompilerBackend`] turns a [`BuildTarget`] plus the list of source
//! files into a binary. Two implementations exist, [`Dmd`] and [`Ldc`]; one
//! of them is selected at startup and wrapped in [`Backend`].
//!
//! # Module Organization
//!
//! - [`target`] - Build cells, results and path display styles
//! - [`dmd`] - The reference compiler
//! - [`ldc`] - The LLVM-based compiler

mod dmd;
mod ldc;
mod target;

pub use dmd::Dmd;
pub use ldc::Ldc;
pub use target::{BuildResult, BuildTarget, PlatformPathStyle};

use crate::release::{
    Error, Result,
    process::{display_command, run_tool},
    settings::{CompilerKind, CompilerSelection},
    tool_detection,
};
use std::path::{Path, PathBuf};

/// A compiler that can build one [`BuildTarget`] at a time.
#[allow(async_fn_in_trait)]
pub trait CompilerBackend {
    /// Short name for logs, e.g. `dmd`.
    fn name(&self) -> &str;

    /// Compiler executable.
    fn executable(&self) -> &Path;

    /// Command line arguments building `target` from `sources`.
    fn arguments(&self, target: &BuildTarget, sources: &[PathBuf]) -> Vec<String>;

    /// Builds `target`. A compiler that runs and fails yields an
    /// unsuccessful [`BuildResult`]; failing to start it is an error.
    async fn invoke(&self, target: &BuildTarget, sources: &[PathBuf]) -> Result<BuildResult> {
        invoke_backend(target, self, sources).await
    }
}

/// Runs `backend` for `target`, going through wine when the target is
/// cross-built.
pub async fn invoke_backend<B: CompilerBackend + ?Sized>(
    target: &BuildTarget,
    backend: &B,
    sources: &[PathBuf],
) -> Result<BuildResult> {
    let mut args = backend.arguments(target, sources);

    let program = if target.use_cross_toolchain() {
        args.insert(
            0,
            target.path_style().to_display_path(backend.executable()),
        );
        tool_detection::WINE
            .clone()
            .unwrap_or_else(|| PathBuf::from("wine"))
    } else {
        backend.executable().to_path_buf()
    };

    log::info!("{}", display_command(&program, &args));

    match run_tool(&program, &args, None).await {
        Ok(output) => Ok(BuildResult::succeeded(target.clone(), output.diagnostics())),
        Err(Error::ToolInvocation {
            status,
            diagnostics,
            ..
        }) => Ok(BuildResult::failed(
            target.clone(),
            format!("{}\n({status})", diagnostics.trim()),
        )),
        Err(e) => Err(e),
    }
}

/// The compiler backend selected for a run.
#[derive(Clone, Debug)]
pub enum Backend {
    Dmd(Dmd),
    Ldc(Ldc),
}

impl Backend {
    /// Instantiates the backend named by the descriptor.
    pub fn from_selection(selection: &CompilerSelection) -> Self {
        match selection.kind {
            CompilerKind::Dmd => Backend::Dmd(Dmd::new(&selection.executable)),
            CompilerKind::Ldc => Backend::Ldc(Ldc::new(&selection.executable)),
        }
    }
}

impl CompilerBackend for Backend {
    fn name(&self) -> &str {
        match self {
            Backend::Dmd(b) => b.name(),
            Backend::Ldc(b) => b.name(),
        }
    }

    fn executable(&self) -> &Path {
        match self {
            Backend::Dmd(b) => b.executable(),
            Backend::Ldc(b) => b.executable(),
        }
    }

    fn arguments(&self, target: &BuildTarget, sources: &[PathBuf]) -> Vec<String> {
        match self {
            Backend::Dmd(b) => b.arguments(target, sources),
            Backend::Ldc(b) => b.arguments(target, sources),
        }
    }
}

/// Renders source paths in the target's path style.
pub(crate) fn display_sources(target: &BuildTarget, sources: &[PathBuf]) -> Vec<String> {
    sources
        .iter()
        .map(|s| target.path_style().to_display_path(s))
        .collect()
}
