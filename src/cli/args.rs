//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap and turns the
//! parsed flags into a [`ReleaseDescriptor`].

use crate::error::Result;
use crate::release::{
    ArchiveFormat, CompilerKind, DescriptorBuilder, PackageSettings, ReleaseDescriptor,
    SourceSpec, Stages, Version,
};
use clap::{CommandFactory, Parser};
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Creates release packages for DIL
#[derive(Parser, Debug)]
#[command(
    name = "dil-release",
    version,
    about = "Creates release packages for DIL",
    override_usage = "dil-release VERSION [OPTIONS]",
    styles = get_styles(),
    after_help = "VERSION format: /\\d.\\d\\d\\d(-\\w+)?/ e.g. 1.042 or 2.007-beta

Exit codes: 0 success, 1 tool or IO failure, 2 invalid configuration."
)]
pub struct Args {
    /// Version of the release, e.g. 1.042
    #[arg(id = "release_version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Further positional arguments are ignored
    #[arg(hide = true)]
    pub ignored: Vec<String>,

    /// Generate debug symbols for debug builds
    #[arg(short = 's', long = "dsymbols")]
    pub debug_symbols: bool,

    /// Generate documentation
    #[arg(short, long)]
    pub docs: bool,

    /// Don't compile code
    #[arg(short = 'n', long = "no-bin")]
    pub no_binaries: bool,

    /// Create a 7z archive
    #[arg(long = "7z")]
    pub seven_zip: bool,

    /// Create a tar.gz archive
    #[arg(long = "gz")]
    pub tar_gz: bool,

    /// Create a tar.bz2 archive
    #[arg(long = "bz2")]
    pub tar_bz2: bool,

    /// Create a zip archive
    #[arg(long)]
    pub zip: bool,

    /// Create a Debian package
    #[arg(long)]
    pub deb: bool,

    /// Create a PDF document (implies --docs)
    #[arg(long)]
    pub pdf: bool,

    /// Copy modified files from the (git) working directory
    #[arg(short = 'm', long = "copy-modified")]
    pub copy_modified: bool,

    /// Use SRC folder instead of checking out code with git
    #[arg(long, value_name = "SRC")]
    pub src: Option<PathBuf>,

    /// Specify EXE_PATH if dmd/ldc is not in your PATH
    #[arg(long = "cmp-exe", value_name = "EXE_PATH", env = "DIL_COMPILER")]
    pub cmp_exe: Option<PathBuf>,

    /// Use ldc instead of dmd
    #[arg(long)]
    pub ldc: bool,

    /// Where to build the release and archives
    #[arg(long, value_name = "DIR", default_value = "build")]
    pub builddir: PathBuf,

    /// Permanently append P to PATH in the Windows (or wine's) registry and exit
    #[arg(long, value_name = "P")]
    pub winpath: Option<String>,

    /// TOML file with [package] metadata overriding the built-in defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debian package revision
    #[arg(long = "deb-revision", value_name = "N", default_value_t = 1)]
    pub deb_revision: u32,
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
        )
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Prints the long help to stdout.
    pub fn print_help() -> std::io::Result<()> {
        Self::command().print_help()
    }

    /// Archive formats in the order they are written.
    pub fn archive_formats(&self) -> Vec<ArchiveFormat> {
        [
            (self.seven_zip, ArchiveFormat::SevenZip),
            (self.tar_gz, ArchiveFormat::TarGz),
            (self.tar_bz2, ArchiveFormat::TarBz2),
            (self.zip, ArchiveFormat::Zip),
        ]
        .into_iter()
        .filter_map(|(enabled, format)| enabled.then_some(format))
        .collect()
    }

    pub fn stages(&self) -> Stages {
        Stages {
            docs: self.docs,
            pdf: self.pdf,
            binaries: !self.no_binaries,
            deb: self.deb,
            debug_symbols: self.debug_symbols,
            archives: self.archive_formats(),
        }
    }

    pub fn compiler_kind(&self) -> CompilerKind {
        if self.ldc {
            CompilerKind::Ldc
        } else {
            CompilerKind::Dmd
        }
    }

    pub fn source(&self) -> SourceSpec {
        match &self.src {
            Some(src) => SourceSpec::Directory(src.clone()),
            None => SourceSpec::GitCheckout {
                repository: PathBuf::from("."),
                copy_modified: self.copy_modified,
            },
        }
    }

    /// Builds the run configuration for `version`.
    pub fn descriptor(&self, version: &str, package: PackageSettings) -> Result<ReleaseDescriptor> {
        let version = Version::parse(version)?;
        let build_dir = self.builddir.absolutize()?.into_owned();

        Ok(DescriptorBuilder::new()
            .version(version)
            .package_settings(package)
            .source(self.source())
            .build_dir(build_dir)
            .compiler(self.compiler_kind(), self.cmp_exe.clone())
            .stages(self.stages())
            .deb_revision(self.deb_revision)
            .build()?)
    }
}
