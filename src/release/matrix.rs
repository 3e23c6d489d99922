//! Build matrix enumeration and execution.
//!
//! The matrix is the cross product of platform, architecture, configuration
//! and language variant. Each populated cell becomes one [`BuildTarget`] that
//! is handed to the selected [`CompilerBackend`].

use crate::release::{
    Error, Result,
    compiler::{BuildResult, BuildTarget, CompilerBackend},
    error::ErrorExt,
    settings::{Architecture, Configuration, LanguageVariant, Platform, ReleaseLayout},
};
use std::path::{Path, PathBuf};

/// Runtime libraries every Linux binary links against.
pub const LINUX_LINK_ARGS: [&str; 3] = ["-ltango-dmd", "-lphobos2", "-ldl"];

/// Which cells of the matrix are built and with which flags.
#[derive(Clone, Debug)]
pub struct BuildMatrix {
    platforms: Vec<Platform>,
    product: String,
    debug_symbols: bool,
    host: Platform,
}

impl BuildMatrix {
    /// Matrix over `platforms` for binaries named after `product`.
    ///
    /// `debug_symbols` adds debug info to debug builds of platforms that do
    /// not get it by default (Windows).
    pub fn new(platforms: &[Platform], product: &str, debug_symbols: bool) -> Self {
        Self {
            platforms: platforms.to_vec(),
            product: product.to_string(),
            debug_symbols,
            host: Platform::host(),
        }
    }

    /// Overrides the host platform used to decide on cross-building.
    pub fn with_host(mut self, host: Platform) -> Self {
        self.host = host;
        self
    }

    /// Enumerates the populated cells in build order.
    ///
    /// Order: architecture, then platform, then debug before release, then
    /// language variant.
    pub fn targets(&self, layout: &ReleaseLayout) -> Vec<BuildTarget> {
        let mut targets = Vec::new();

        for arch in Architecture::ALL {
            if !arch.is_populated() {
                log::debug!("Skipping {}-bit cells: not supported yet", arch.bits());
                continue;
            }
            for &platform in &self.platforms {
                let bin_dir = layout.bin_dir(platform, arch);
                for configuration in Configuration::ALL {
                    for variant in LanguageVariant::ALL {
                        targets.push(self.target(platform, arch, configuration, variant, &bin_dir));
                    }
                }
            }
        }

        targets
    }

    /// The host's debug V1 cell, written to `output` instead of a `bin`
    /// directory. Carries the same flags as the matrix cell.
    pub fn host_debug_target(&self, output: &Path) -> BuildTarget {
        let dir = output.parent().unwrap_or(Path::new("."));
        self.target(
            self.host,
            Architecture::X86,
            Configuration::Debug,
            LanguageVariant::V1,
            dir,
        )
        .with_output_path(output)
    }

    fn target(
        &self,
        platform: Platform,
        arch: Architecture,
        configuration: Configuration,
        variant: LanguageVariant,
        bin_dir: &Path,
    ) -> BuildTarget {
        let debug_info = configuration == Configuration::Debug
            && (platform == Platform::Linux || self.debug_symbols);
        let link_args: &[&str] = match platform {
            Platform::Linux => &LINUX_LINK_ARGS,
            Platform::Windows => &[],
        };

        BuildTarget::new(platform, arch, configuration, variant, bin_dir, &self.product)
            .with_link_args(link_args.iter().copied())
            .with_debug_info(debug_info)
            .with_cross_toolchain(platform == Platform::Windows && self.host != Platform::Windows)
    }
}

/// Builds every cell of a [`BuildMatrix`] with one backend.
pub struct BuildMatrixExecutor<'a, B: CompilerBackend> {
    backend: &'a B,
    matrix: BuildMatrix,
}

impl<'a, B: CompilerBackend> BuildMatrixExecutor<'a, B> {
    pub fn new(backend: &'a B, matrix: BuildMatrix) -> Self {
        Self { backend, matrix }
    }

    /// Builds all targets sequentially.
    ///
    /// Output directories are created as needed. The first failing cell
    /// aborts the run with [`Error::ToolInvocation`]; nothing is retried.
    pub async fn run(&self, layout: &ReleaseLayout, sources: &[PathBuf]) -> Result<Vec<BuildResult>> {
        let mut results = Vec::new();
        let mut current_section = None;

        for target in self.matrix.targets(layout) {
            let section = (target.platform(), target.architecture());
            if current_section != Some(section) {
                log::info!("***** Building {} binaries *****", target.platform());
                current_section = Some(section);
            }

            if let Some(dir) = target.output_path().parent() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .fs_context("creating binary directory", dir)?;
            }

            let result = self.backend.invoke(&target, sources).await?;
            if !result.success() {
                return Err(Error::ToolInvocation {
                    command: format!(
                        "{} building {}",
                        self.backend.name(),
                        target.output_path().display()
                    ),
                    status: "build failed".into(),
                    diagnostics: result.diagnostics().to_string(),
                });
            }
            results.push(result);
        }

        Ok(results)
    }
}

/// Copies the configuration file next to the binaries of every populated
/// `bin` directory.
pub async fn install_config(config_file: &Path, results: &[BuildResult]) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<&Path> = results
        .iter()
        .filter_map(|r| r.binary_path())
        .filter_map(Path::parent)
        .collect();
    dirs.dedup();

    let file_name = config_file
        .file_name()
        .ok_or_else(|| Error::GenericError(format!("{} has no file name", config_file.display())))?;

    let mut installed = Vec::new();
    for dir in dirs {
        let dest = dir.join(file_name);
        tokio::fs::copy(config_file, &dest)
            .await
            .fs_context("copying configuration file", &dest)?;
        installed.push(dest);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Writes every requested binary and records the order of calls.
    /// Fails the cell with index `fail_at`.
    struct RecordingBackend {
        calls: Mutex<Vec<PathBuf>>,
        fail_at: Option<usize>,
    }

    impl RecordingBackend {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at,
            }
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CompilerBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn executable(&self) -> &Path {
            Path::new("recording")
        }

        fn arguments(&self, _target: &BuildTarget, _sources: &[PathBuf]) -> Vec<String> {
            Vec::new()
        }

        async fn invoke(&self, target: &BuildTarget, _sources: &[PathBuf]) -> Result<BuildResult> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(target.output_path().to_path_buf());
                calls.len() - 1
            };
            if self.fail_at == Some(index) {
                return Ok(BuildResult::failed(target.clone(), "main.d(1): Error".into()));
            }
            std::fs::write(target.output_path(), b"\x7fELF").unwrap();
            Ok(BuildResult::succeeded(target.clone(), String::new()))
        }
    }

    fn linux_matrix() -> BuildMatrix {
        BuildMatrix::new(&[Platform::Linux], "dil", false).with_host(Platform::Linux)
    }

    #[tokio::test]
    async fn builds_every_cell_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::new(tmp.path().join("dil.1.042"));
        let backend = RecordingBackend::new(None);

        let results = BuildMatrixExecutor::new(&backend, linux_matrix())
            .run(&layout, &[])
            .await
            .unwrap();

        let bin = layout.bin_dir(Platform::Linux, Architecture::X86);
        assert_eq!(
            backend.calls(),
            [
                bin.join("dil1_dbg"),
                bin.join("dil2_dbg"),
                bin.join("dil1"),
                bin.join("dil2")
            ]
        );
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.success() && r.binary_path().is_some()));
    }

    #[tokio::test]
    async fn first_failing_cell_aborts_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::new(tmp.path().join("dil.1.042"));
        let backend = RecordingBackend::new(Some(1));

        let err = BuildMatrixExecutor::new(&backend, linux_matrix())
            .run(&layout, &[])
            .await
            .unwrap_err();

        match err {
            Error::ToolInvocation { diagnostics, .. } => {
                assert!(diagnostics.contains("main.d(1): Error"))
            }
            other => panic!("unexpected error: {other}"),
        }
        // dil2_dbg failed; the release cells never ran.
        assert_eq!(backend.calls().len(), 2);
        let bin = layout.bin_dir(Platform::Linux, Architecture::X86);
        assert!(!bin.join("dil1").exists());
    }

    #[tokio::test]
    async fn existing_bin_directory_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::new(tmp.path().join("dil.1.042"));
        let bin = layout.bin_dir(Platform::Linux, Architecture::X86);
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("notes.txt"), "keep").unwrap();

        for _ in 0..2 {
            let backend = RecordingBackend::new(None);
            BuildMatrixExecutor::new(&backend, linux_matrix())
                .run(&layout, &[])
                .await
                .unwrap();
        }
        assert!(bin.join("dil2").is_file());
        assert!(bin.join("notes.txt").is_file());
    }

    #[tokio::test]
    async fn no_platforms_build_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("dil.1.042");
        std::fs::create_dir_all(&root).unwrap();
        let layout = ReleaseLayout::new(&root);
        let backend = RecordingBackend::new(None);

        let matrix = BuildMatrix::new(&[], "dil", true).with_host(Platform::Linux);
        let results = BuildMatrixExecutor::new(&backend, matrix)
            .run(&layout, &[])
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(backend.calls().is_empty());
        assert!(!root.join("linux").exists());
        assert!(!root.join("windows").exists());
    }

    #[tokio::test]
    async fn config_is_installed_next_to_each_bin_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ReleaseLayout::new(tmp.path().join("dil.1.042"));
        let config = layout.config_file("dil");
        std::fs::create_dir_all(config.parent().unwrap()).unwrap();
        std::fs::write(&config, "DATADIR = ${BINDIR}/../data\n").unwrap();

        let backend = RecordingBackend::new(None);
        let matrix = BuildMatrix::new(&[Platform::Linux, Platform::Windows], "dil", false)
            .with_host(Platform::Windows);
        let results = BuildMatrixExecutor::new(&backend, matrix)
            .run(&layout, &[])
            .await
            .unwrap();

        let installed = install_config(&config, &results).await.unwrap();
        let linux = layout.bin_dir(Platform::Linux, Architecture::X86).join("dilconf.d");
        let windows = layout.bin_dir(Platform::Windows, Architecture::X86).join("dilconf.d");
        assert_eq!(installed, [linux.clone(), windows.clone()]);
        assert_eq!(
            std::fs::read_to_string(windows).unwrap(),
            "DATADIR = ${BINDIR}/../data\n"
        );
    }

    #[tokio::test]
    async fn failed_results_get_no_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = tmp.path().join("dilconf.d");
        std::fs::write(&config, "").unwrap();
        let target = BuildTarget::new(
            Platform::Linux,
            Architecture::X86,
            Configuration::Debug,
            LanguageVariant::V1,
            &tmp.path().join("linux/bin32"),
            "dil",
        );
        let results = [BuildResult::failed(target, "error".into())];

        assert!(install_config(&config, &results).await.unwrap().is_empty());
    }

    #[test]
    fn linux_cells_in_build_order() {
        let layout = ReleaseLayout::new("rel");
        let matrix = BuildMatrix::new(&[Platform::Linux], "dil", false).with_host(Platform::Linux);
        let names: Vec<_> = matrix
            .targets(&layout)
            .iter()
            .map(|t| t.output_path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["dil1_dbg", "dil2_dbg", "dil1", "dil2"]);
    }

    #[test]
    fn no_64_bit_cells() {
        let layout = ReleaseLayout::new("rel");
        let matrix = BuildMatrix::new(&[Platform::Linux, Platform::Windows], "dil", false)
            .with_host(Platform::Linux);
        let targets = matrix.targets(&layout);
        assert_eq!(targets.len(), 8);
        assert!(targets.iter().all(|t| t.architecture() == Architecture::X86));
    }

    #[test]
    fn platform_flags() {
        let layout = ReleaseLayout::new("rel");
        let matrix = BuildMatrix::new(&[Platform::Linux, Platform::Windows], "dil", false)
            .with_host(Platform::Linux);
        let targets = matrix.targets(&layout);

        let linux_dbg = &targets[0];
        assert_eq!(linux_dbg.extra_link_args(), LINUX_LINK_ARGS);
        assert!(linux_dbg.include_debug_info());
        assert!(!linux_dbg.use_cross_toolchain());

        let linux_rls = &targets[2];
        assert!(!linux_rls.include_debug_info());

        let win_dbg = &targets[4];
        assert_eq!(win_dbg.platform(), Platform::Windows);
        assert!(win_dbg.extra_link_args().is_empty());
        assert!(!win_dbg.include_debug_info());
        assert!(win_dbg.use_cross_toolchain());
        assert!(win_dbg.output_path().ends_with("windows/bin32/dil1_dbg.exe"));
    }

    #[test]
    fn dsymbols_adds_windows_debug_info() {
        let layout = ReleaseLayout::new("rel");
        let matrix =
            BuildMatrix::new(&[Platform::Windows], "dil", true).with_host(Platform::Windows);
        let targets = matrix.targets(&layout);
        assert!(targets[0].include_debug_info());
        assert!(!targets[0].use_cross_toolchain());
        assert!(!targets[2].include_debug_info());
    }
}
