//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const VERSION_D: &str = r#"module dil.Version;

enum uint VERSION_MAJOR = 1;
enum uint VERSION_MINOR = 0;
enum string VERSION_SUFFIX = "";
"#;

/// A minimal DIL source tree next to an empty build directory
pub struct DilTree {
    _root: TempDir,
    pub src: PathBuf,
    pub build: PathBuf,
}

impl DilTree {
    /// Create the tree with every file the pipeline copies or stamps
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let src = root.path().join("dil");
        let build = root.path().join("build");

        let files: &[(&str, &str)] = &[
            ("src/dil/Version.d", VERSION_D),
            ("src/main.d", "module main;\nvoid main() {}\n"),
            ("src/dil/lexer/Lexer.d", "module dil.lexer.Lexer;\n"),
            ("data/dilconf.d", "DATADIR = ${BINDIR}/../data\n"),
            ("data/html.css", "body {}\n"),
            ("data/macros_dil.ddoc", "DDOC = $(BODY)\n"),
            ("kandil/css/style.css", "#kandil {}\n"),
            ("kandil/js/navigation.js", "// nav\n"),
            ("kandil/js/jquery.js", "// jq\n"),
            ("kandil/js/README", "not a script\n"),
            ("kandil/img/icon_module.png", "png"),
        ];
        for (rel, content) in files {
            let path = src.join(rel);
            std::fs::create_dir_all(path.parent().context("fixture path has a parent")?)?;
            std::fs::write(&path, content)?;
        }

        Ok(Self { _root: root, src, build })
    }

    /// Release tree root for `version`
    pub fn release_root(&self, version: &str) -> PathBuf {
        self.build.join(format!("dil.{version}"))
    }

    pub fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// Command running the dil-release binary with logging silenced
pub fn dil_release() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("dil-release").expect("binary is built");
    cmd.env_remove("DIL_COMPILER").env("RUST_LOG", "off");
    cmd
}

/// Entry names of a tar.gz archive, sorted
pub fn tar_gz_entries(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut names = Vec::new();
    for entry in archive.entries()? {
        names.push(entry?.path()?.to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Entry names of a zip archive, sorted
pub fn zip_entries(path: &Path) -> Result<Vec<String>> {
    let archive = zip::ZipArchive::new(std::fs::File::open(path)?)?;
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    Ok(names)
}

/// Write an executable shell script into `dir`
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Stand-in compiler writing a small file to its `-of` path
#[cfg(unix)]
pub fn fake_compiler(dir: &Path) -> Result<PathBuf> {
    write_script(
        dir,
        "dmd",
        r#"for arg in "$@"; do
  case "$arg" in
    -of*) printf 'ELF' > "${arg#-of}" ;;
  esac
done
"#,
    )
}
