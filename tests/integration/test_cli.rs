//! Tests for the command line surface

use crate::helpers::*;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_no_arguments_prints_usage() {
    dil_release()
        .assert()
        .success()
        .stdout(predicate::str::contains("dil-release VERSION [OPTIONS]"))
        .stdout(predicate::str::contains("--cmp-exe"));
}

#[test]
fn test_malformed_version_exits_with_config_code() {
    dil_release()
        .args(["1.2", "-n"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_src_exits_with_config_code() -> Result<()> {
    let tree = DilTree::new()?;
    dil_release()
        .args(["1.042", "-n", "--src"])
        .arg(tree.src.join("missing"))
        .arg("--builddir")
        .arg(&tree.build)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("doesn't exist"));
    Ok(())
}

#[test]
fn test_deb_without_binaries_is_rejected() -> Result<()> {
    let tree = DilTree::new()?;
    dil_release()
        .args(["1.042", "-n", "--deb", "--src"])
        .arg(&tree.src)
        .arg("--builddir")
        .arg(&tree.build)
        .assert()
        .code(2);
    assert!(!tree.build.exists());
    Ok(())
}

#[test]
fn test_source_release_with_gz_archive() -> Result<()> {
    let tree = DilTree::new()?;
    dil_release()
        .args(["1.042", "-n", "--gz", "extra", "--src"])
        .arg(&tree.src)
        .arg("--builddir")
        .arg(&tree.build)
        .assert()
        .success()
        .stderr(predicate::str::contains("Arguments ignored: extra"));

    assert!(tree.build.join("dil.1.042.tar.gz").is_file());
    assert!(tree.release_root("1.042").join("VERSION").is_file());
    assert!(tree.build.join("release-report.json").is_file());
    Ok(())
}

#[test]
fn test_bad_config_file_exits_with_config_code() -> Result<()> {
    let tree = DilTree::new()?;
    let config = tree.build.with_file_name("release.toml");
    std::fs::write(&config, "[package]\nunknown_key = 1\n")?;

    dil_release()
        .args(["1.042", "-n", "--src"])
        .arg(&tree.src)
        .arg("--config")
        .arg(&config)
        .arg("--builddir")
        .arg(&tree.build)
        .assert()
        .code(2);
    Ok(())
}
