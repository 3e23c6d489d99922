//! Documentation generation.
//!
//! HTML is rendered by the product's own executable (`dil ddoc`). When that
//! executable is missing it is bootstrapped with the selected compiler
//! backend first. The PDF is converted from the finished HTML tree.

mod pdf;
mod template;

pub use pdf::{PdfGenerator, PdfParams, html_files, render_cover};

use crate::release::{
    Error, Result,
    compiler::{BuildTarget, CompilerBackend},
    matrix::BuildMatrix,
    process::run_tool,
    settings::ReleaseDescriptor,
};
use std::path::{Path, PathBuf};

/// Sequences HTML generation and PDF conversion for one release.
#[derive(Debug)]
pub struct DocumentationDispatcher<'a> {
    descriptor: &'a ReleaseDescriptor,
}

impl<'a> DocumentationDispatcher<'a> {
    pub fn new(descriptor: &'a ReleaseDescriptor) -> Self {
        Self { descriptor }
    }

    /// List of processed modules written by the generator.
    pub fn module_list(&self) -> PathBuf {
        self.descriptor.temporary_root().join("modules.txt")
    }

    /// Destination of the API PDF, e.g. `doc/dil.1.042.API.pdf`.
    pub fn pdf_path(&self) -> PathBuf {
        self.descriptor.layout().doc().join(format!(
            "{}.{}.API.pdf",
            self.descriptor.product_name(),
            self.descriptor.version()
        ))
    }

    /// Cell that bootstraps the documentation generator: a debug, host
    /// platform, V1 build with the matrix flags of that cell.
    pub fn generator_target(&self) -> BuildTarget {
        BuildMatrix::new(
            &[],
            self.descriptor.product_name(),
            self.descriptor.stages().debug_symbols,
        )
        .host_debug_target(self.descriptor.doc_generator())
    }

    /// Returns the documentation generator, building it first if it does
    /// not exist.
    pub async fn ensure_generator<B: CompilerBackend>(
        &self,
        backend: &B,
        sources: &[PathBuf],
    ) -> Result<PathBuf> {
        let generator = self.descriptor.doc_generator();
        if generator.is_file() {
            return Ok(generator.to_path_buf());
        }

        log::info!(
            "***** Building {} to generate documentation *****",
            generator.display()
        );
        let target = self.generator_target();
        if let Some(dir) = target.output_path().parent() {
            crate::release::utils::fs::create_dir_all(dir, false).await?;
        }
        let result = backend.invoke(&target, sources).await?;
        match result.binary_path() {
            Some(path) => Ok(path.to_path_buf()),
            None => Err(Error::ToolInvocation {
                command: format!("{} building {}", backend.name(), generator.display()),
                status: "build failed".into(),
                diagnostics: result.diagnostics().to_string(),
            }),
        }
    }

    /// Arguments of the HTML generation run.
    pub fn html_arguments(&self, sources: &[PathBuf]) -> Vec<String> {
        let layout = self.descriptor.layout();
        let product = self.descriptor.product_name();

        let mut args = vec![
            "ddoc".to_string(),
            layout.doc().to_string_lossy().into_owned(),
            format!("-m={}", self.module_list().display()),
            "-version=DDoc".to_string(),
            "-v".to_string(),
            "-i".to_string(),
            "-hl".to_string(),
            "--kandil".to_string(),
            layout.ddoc_macros(product).to_string_lossy().into_owned(),
            layout.config_file(product).to_string_lossy().into_owned(),
        ];
        args.extend(sources.iter().map(|s| s.to_string_lossy().into_owned()));
        args
    }

    /// Renders the HTML documentation of `sources` into the doc directory.
    pub async fn generate_html(&self, generator: &Path, sources: &[PathBuf]) -> Result<()> {
        log::info!("***** Generating documentation *****");
        let args = self.html_arguments(sources);
        let output = run_tool(generator, &args, None).await?;
        for line in output.stdout.lines() {
            log::debug!("{}", line);
        }
        Ok(())
    }

    /// Converts the generated HTML into the API PDF.
    pub async fn write_pdf(&self) -> Result<PathBuf> {
        log::info!("***** Creating PDF *****");
        let html = html_files(&self.descriptor.layout().doc())?;
        let params = PdfParams::for_release(self.descriptor.package(), self.descriptor.version());
        PdfGenerator::new(self.descriptor.pdf_converter())
            .run(&html, &self.pdf_path(), self.descriptor.temporary_root(), &params)
            .await
    }
}
