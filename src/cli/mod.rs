//! Command line interface for dil-release.
//!
//! Parses arguments, validates them, runs the release pipeline and reports
//! the produced artifacts.

mod args;
mod output;
pub mod winpath;

pub use args::Args;
pub use output::OutputManager;

use crate::{
    error::Result,
    metadata,
    release::{PackageSettings, ReleasePipeline, ReleaseReport},
};

/// Main CLI entry point. Returns the process exit code.
pub async fn run() -> i32 {
    let args = Args::parse_args();
    let output = OutputManager::new(log::log_enabled!(log::Level::Debug));
    match execute(&args, &output).await {
        Ok(code) => code,
        Err(e) => {
            let _ = output.error(&e.to_string());
            e.exit_code()
        }
    }
}

/// Runs the release described by `args`.
pub async fn execute(args: &Args, output: &OutputManager) -> Result<i32> {
    if let Some(entry) = &args.winpath {
        let path = winpath::append_to_path(entry).await?;
        output.success(&format!("PATH={path}"))?;
        return Ok(0);
    }

    let Some(version) = &args.version else {
        Args::print_help()?;
        return Ok(0);
    };
    if !args.ignored.is_empty() {
        output.warn(&format!("Arguments ignored: {}", args.ignored.join(" ")))?;
    }

    let package = match &args.config {
        Some(path) => metadata::load_config(path)?,
        None => PackageSettings::default(),
    };
    let descriptor = args.descriptor(version, package)?;

    output.section(&format!(
        "Building {} {} in {}",
        descriptor.product_name(),
        descriptor.version(),
        descriptor.build_dir().display()
    ))?;

    let mut pipeline = ReleasePipeline::new(descriptor);
    match pipeline.run().await {
        Ok(report) => {
            print_report(&report, output)?;
            Ok(0)
        }
        Err(e) => {
            output.verbose(&format!("halted after stage {:?}", pipeline.stage()))?;
            Err(e.into())
        }
    }
}

fn print_report(report: &ReleaseReport, output: &OutputManager) -> Result<()> {
    output.success(&format!("Release tree: {}", report.destination.display()))?;
    for result in &report.binaries {
        if let Some(path) = result.binary_path() {
            output.indent(&path.display().to_string())?;
        }
    }
    if let Some(pdf) = &report.pdf {
        output.success(&format!("PDF: {}", pdf.display()))?;
    }
    for package in &report.packages {
        output.success(&format!(
            "Package: {} ({} KiB installed)",
            package.path.display(),
            package.manifest.installed_size_kib()
        ))?;
    }
    for archive in &report.archives {
        output.success(&format!("Archive: {}", archive.path.display()))?;
        output.indent(&format!("sha256 {}  {} bytes", archive.sha256, archive.size))?;
    }
    output.progress("Done!")?;
    Ok(())
}
