//! Paths inside a release tree.

use super::{Architecture, Platform};
use std::path::{Path, PathBuf};

/// Directory layout of a DIL source tree used as release root.
///
/// ```text
/// dil.1.042/
/// ├── VERSION
/// ├── src/dil/Version.d
/// ├── data/{dilconf.d, html.css, macros_dil.ddoc}
/// ├── kandil/{css/style.css, js/*.js, img/*}
/// ├── doc/{htmlsrc, css, img, js}
/// └── linux/bin32, windows/bin32
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseLayout {
    root: PathBuf,
}

impl ReleaseLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `VERSION` marker file.
    pub fn version_marker(&self) -> PathBuf {
        self.root.join("VERSION")
    }

    /// Compiler sources.
    pub fn src(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Source file carrying the version constants.
    pub fn version_source(&self) -> PathBuf {
        self.src().join("dil").join("Version.d")
    }

    pub fn data(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Configuration file shipped next to binaries and in packages.
    pub fn config_file(&self, product: &str) -> PathBuf {
        self.data().join(format!("{product}conf.d"))
    }

    /// DDoc macro file passed first to the documentation generator.
    pub fn ddoc_macros(&self, product: &str) -> PathBuf {
        self.data().join(format!("macros_{product}.ddoc"))
    }

    pub fn html_css(&self) -> PathBuf {
        self.data().join("html.css")
    }

    pub fn kandil(&self) -> PathBuf {
        self.root.join("kandil")
    }

    pub fn kandil_style(&self) -> PathBuf {
        self.kandil().join("css").join("style.css")
    }

    pub fn kandil_js(&self) -> PathBuf {
        self.kandil().join("js")
    }

    pub fn kandil_img(&self) -> PathBuf {
        self.kandil().join("img")
    }

    /// Documentation output directory.
    pub fn doc(&self) -> PathBuf {
        self.root.join("doc")
    }

    pub fn doc_htmlsrc(&self) -> PathBuf {
        self.doc().join("htmlsrc")
    }

    pub fn doc_css(&self) -> PathBuf {
        self.doc().join("css")
    }

    pub fn doc_img(&self) -> PathBuf {
        self.doc().join("img")
    }

    pub fn doc_js(&self) -> PathBuf {
        self.doc().join("js")
    }

    /// Directories that a clean checkout lacks and the pipeline recreates.
    pub fn doc_dirs(&self) -> [PathBuf; 5] {
        [
            self.doc(),
            self.doc_htmlsrc(),
            self.doc_css(),
            self.doc_img(),
            self.doc_js(),
        ]
    }

    /// Binary output directory, e.g. `linux/bin32`.
    pub fn bin_dir(&self, platform: Platform, arch: Architecture) -> PathBuf {
        self.root
            .join(platform.dir_name())
            .join(format!("bin{}", arch.bits()))
    }
}
