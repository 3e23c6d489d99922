//! HTML to PDF conversion.

use super::template::COVER_TEMPLATE;
use crate::{
    bail,
    release::{
        Error, Result,
        error::ErrorExt,
        process::run_tool,
        settings::{PackageSettings, Version},
        tool_detection,
        utils::fs,
    },
};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Document metadata of the API PDF.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PdfParams {
    pub pdf_title: String,
    /// Cover heading; may contain inline HTML.
    pub cover_title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    /// Indent table of contents entries by module depth.
    pub nested_toc: bool,
    /// Base URL of the online docs, empty to omit links.
    pub symbol_url: String,
}

impl PdfParams {
    pub fn for_release(package: &PackageSettings, version: &Version) -> Self {
        let product = package.product_name.to_uppercase();
        Self {
            pdf_title: format!("{product} {version} API"),
            cover_title: format!("{product} {version}<br/><b>API</b>"),
            author: package.author.clone(),
            subject: "Compiler API".into(),
            keywords: format!("{product} D compiler API documentation"),
            nested_toc: true,
            symbol_url: package.symbol_url_for(version.as_str()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct TocEntry {
    href: String,
    title: String,
    depth: usize,
    online: Option<String>,
}

fn toc_entries(html_files: &[PathBuf], params: &PdfParams) -> Vec<TocEntry> {
    html_files
        .iter()
        .filter_map(|file| {
            let title = file.file_stem()?.to_string_lossy().into_owned();
            let name = file.file_name()?.to_string_lossy().into_owned();
            let depth = if params.nested_toc {
                title.matches('.').count()
            } else {
                0
            };
            let online = (!params.symbol_url.is_empty())
                .then(|| format!("{}/{name}", params.symbol_url.trim_end_matches('/')));
            Some(TocEntry {
                href: file.to_string_lossy().into_owned(),
                title,
                depth,
                online,
            })
        })
        .collect()
}

/// Renders the cover and table of contents page.
pub fn render_cover(html_files: &[PathBuf], params: &PdfParams) -> Result<String> {
    let entries = toc_entries(html_files, params);
    let mut depths: Vec<usize> = entries.iter().map(|e| e.depth).filter(|&d| d > 0).collect();
    depths.sort_unstable();
    depths.dedup();

    let mut handlebars = Handlebars::new();
    handlebars
        .register_template_string("cover.html", COVER_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register cover template: {e}")))?;

    let data = json!({
        "pdf_title": params.pdf_title,
        "cover_title": params.cover_title,
        "author": params.author,
        "subject": params.subject,
        "keywords": params.keywords,
        "depths": depths,
        "entries": entries,
    });

    handlebars
        .render("cover.html", &data)
        .map_err(|e| Error::GenericError(format!("failed to render cover template: {e}")))
}

/// `*.html` files directly inside `dir`, sorted.
pub fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::glob_files(dir, "*.html")
}

/// Drives the external HTML to PDF converter.
#[derive(Clone, Debug)]
pub struct PdfGenerator {
    converter: PathBuf,
}

impl PdfGenerator {
    pub fn new(converter: impl AsRef<Path>) -> Self {
        Self {
            converter: converter.as_ref().to_path_buf(),
        }
    }

    /// Converts `html_files` into `dest`, prefixed by a generated cover.
    /// Scratch files go to `tmp`.
    pub async fn run(
        &self,
        html_files: &[PathBuf],
        dest: &Path,
        tmp: &Path,
        params: &PdfParams,
    ) -> Result<PathBuf> {
        let converter = tool_detection::locate(&self.converter)
            .ok_or_else(|| Error::ToolNotFound(self.converter.display().to_string()))?;
        if html_files.is_empty() {
            bail!("no HTML files to convert into {}", dest.display());
        }

        let pdf_tmp = tmp.join("pdf");
        tokio::fs::create_dir_all(&pdf_tmp)
            .await
            .fs_context("creating PDF scratch directory", &pdf_tmp)?;
        let cover = pdf_tmp.join("cover.html");
        tokio::fs::write(&cover, render_cover(html_files, params)?)
            .await
            .fs_context("writing PDF cover", &cover)?;

        let mut args = vec![
            format!("--pdf-title={}", params.pdf_title),
            format!("--pdf-author={}", params.author),
            format!("--pdf-subject={}", params.subject),
            format!("--pdf-keywords={}", params.keywords),
            "-o".to_string(),
            dest.to_string_lossy().into_owned(),
            cover.to_string_lossy().into_owned(),
        ];
        args.extend(html_files.iter().map(|f| f.to_string_lossy().into_owned()));

        log::info!("Writing {}", dest.display());
        run_tool(&converter, &args, None).await?;
        Ok(dest.to_path_buf())
    }
}
