//! Tests for the release pipeline driven through the library API

use crate::helpers::*;
use anyhow::Result;
use dil_release::release::{
    ArchiveFormat, CompilerKind, DescriptorBuilder, Error, Platform, ReleasePipeline, SourceSpec,
    Stage, Stages, Version,
};

fn pipeline(tree: &DilTree, version: &str, stages: Stages) -> Result<ReleasePipeline> {
    let descriptor = DescriptorBuilder::new()
        .version(Version::parse(version)?)
        .source(SourceSpec::Directory(tree.src.clone()))
        .build_dir(&tree.build)
        .platforms(vec![Platform::Linux])
        .stages(stages)
        .build()?;
    Ok(ReleasePipeline::new(descriptor))
}

#[tokio::test]
async fn test_source_only_release_with_archives() -> Result<()> {
    let tree = DilTree::new()?;
    let mut pipeline = pipeline(
        &tree,
        "2.007-beta",
        Stages {
            archives: vec![ArchiveFormat::TarGz, ArchiveFormat::Zip],
            ..Default::default()
        },
    )?;

    let report = pipeline.run().await?;
    let root = tree.release_root("2.007-beta");

    assert_eq!(
        report.stages,
        [
            Stage::Init,
            Stage::TreePrepared,
            Stage::VersionStamped,
            Stage::Archived,
            Stage::Cleaned
        ]
    );
    assert_eq!(pipeline.stage(), Stage::Cleaned);

    assert_eq!(tree.read(&root.join("VERSION"))?, "2.007-beta\n");
    let version_d = tree.read(&root.join("src/dil/Version.d"))?;
    assert!(version_d.contains("VERSION_MAJOR = 2;"));
    assert!(version_d.contains("VERSION_MINOR = 7;"));
    assert!(version_d.contains(r#"VERSION_SUFFIX = "-beta";"#));
    // The source tree is left untouched.
    assert!(tree.read(&tree.src.join("src/dil/Version.d"))?.contains("VERSION_MAJOR = 1;"));

    assert!(!root.join("doc").exists());
    assert!(!root.join("linux").exists());
    assert!(!tree.build.join("dil.2.007-beta.tmp").exists());
    assert!(report.binaries.is_empty());
    assert!(report.pdf.is_none());

    assert_eq!(report.archives.len(), 2);
    let tar_gz = tree.build.join("dil.2.007-beta.tar.gz");
    let zip = tree.build.join("dil.2.007-beta.zip");
    assert_eq!(report.archives[0].path, tar_gz);
    assert_eq!(report.archives[1].path, zip);
    for archive in &report.archives {
        assert_eq!(archive.sha256.len(), 64);
        assert_eq!(archive.size, std::fs::metadata(&archive.path)?.len());
    }

    let entries = tar_gz_entries(&tar_gz)?;
    assert!(entries.contains(&"dil.2.007-beta/VERSION".to_string()));
    assert!(entries.contains(&"dil.2.007-beta/src/dil/Version.d".to_string()));
    assert!(entries.iter().all(|e| e.starts_with("dil.2.007-beta")));
    assert!(zip_entries(&zip)?.contains(&"dil.2.007-beta/data/dilconf.d".to_string()));

    let json: serde_json::Value =
        serde_json::from_str(&tree.read(&tree.build.join("release-report.json"))?)?;
    assert_eq!(json["version"], "2.007-beta");
    assert_eq!(json["archives"][0]["format"], "tar.gz");
    assert_eq!(json["stages"][2], "version-stamped");

    Ok(())
}

#[tokio::test]
async fn test_rerun_replaces_previous_tree() -> Result<()> {
    let tree = DilTree::new()?;
    let root = tree.release_root("1.042");

    pipeline(&tree, "1.042", Stages::default())?.run().await?;
    std::fs::write(root.join("stale.txt"), "left over")?;

    pipeline(&tree, "1.042", Stages::default())?.run().await?;
    assert!(!root.join("stale.txt").exists());
    assert_eq!(tree.read(&root.join("VERSION"))?, "1.042\n");

    Ok(())
}

#[tokio::test]
async fn test_missing_version_marker_halts_after_tree_preparation() -> Result<()> {
    let tree = DilTree::new()?;
    std::fs::write(tree.src.join("src/dil/Version.d"), "module dil.Version;\n")?;

    let mut pipeline = pipeline(&tree, "1.042", Stages::default())?;
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::VersionMarkerMissing { marker: "VERSION_MAJOR", .. }));
    assert_eq!(pipeline.stage(), Stage::TreePrepared);
    assert!(tree.release_root("1.042").join("src/main.d").exists());
    assert!(!tree.build.join("dil.1.042.tmp").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_source_directory_is_config_error() -> Result<()> {
    let tree = DilTree::new()?;
    let descriptor = DescriptorBuilder::new()
        .version(Version::parse("1.042")?)
        .source(SourceSpec::Directory(tree.src.join("nope")))
        .build_dir(&tree.build)
        .platforms(vec![Platform::Linux])
        .build()?;

    let err = ReleasePipeline::new(descriptor).run().await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!tree.build.exists());

    Ok(())
}

#[cfg(unix)]
fn binary_pipeline(tree: &DilTree, packaging_tool: &std::path::Path) -> Result<ReleasePipeline> {
    let tools = tree.build.with_file_name("tools");
    let descriptor = DescriptorBuilder::new()
        .version(Version::parse("1.042")?)
        .source(SourceSpec::Directory(tree.src.clone()))
        .build_dir(&tree.build)
        .platforms(vec![Platform::Linux])
        .compiler(CompilerKind::Dmd, Some(fake_compiler(&tools)?))
        .packaging_tool(packaging_tool)
        .stages(Stages {
            binaries: true,
            deb: true,
            ..Default::default()
        })
        .build()?;
    Ok(ReleasePipeline::new(descriptor))
}

#[cfg(unix)]
#[tokio::test]
async fn test_binaries_are_built_and_packaged() -> Result<()> {
    let tree = DilTree::new()?;
    let tools = tree.build.with_file_name("tools");
    let dpkg_deb = write_script(
        &tools,
        "dpkg-deb",
        "for last in \"$@\"; do :; done\nprintf 'deb' > \"$last\"\n",
    )?;

    let mut pipeline = binary_pipeline(&tree, &dpkg_deb)?;
    let report = pipeline.run().await?;

    assert_eq!(
        report.stages,
        [
            Stage::Init,
            Stage::TreePrepared,
            Stage::VersionStamped,
            Stage::BinariesBuilt,
            Stage::Packaged,
            Stage::Archived,
            Stage::Cleaned
        ]
    );

    let bin = tree.release_root("1.042").join("linux/bin32");
    for name in ["dil1_dbg", "dil2_dbg", "dil1", "dil2", "dilconf.d"] {
        assert!(bin.join(name).is_file(), "missing {name}");
    }
    assert_eq!(report.binaries.len(), 4);

    assert_eq!(report.packages.len(), 1);
    let package = &report.packages[0];
    assert_eq!(package.path, tree.build.join("dil_1.042-1_i386.deb"));
    assert!(package.path.is_file());
    assert_eq!(package.manifest.version, "1.042-1");
    let paths: Vec<_> = package
        .manifest
        .file_checksums
        .iter()
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(paths, ["etc/dilconf.d", "usr/bin/dil1", "usr/bin/dil2"]);

    assert!(!tree.build.join("dil.1.042.pkg").exists());
    assert!(!tree.build.join("dil.1.042.tmp").exists());

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_failed_seal_keeps_package_skeleton() -> Result<()> {
    let tree = DilTree::new()?;
    let tools = tree.build.with_file_name("tools");
    let dpkg_deb = write_script(
        &tools,
        "dpkg-deb",
        "echo 'dpkg-deb: error: broken' >&2\nexit 2\n",
    )?;

    let mut pipeline = binary_pipeline(&tree, &dpkg_deb)?;
    let err = pipeline.run().await.unwrap_err();

    let skeleton = tree.build.join("dil.1.042.pkg/debian");
    match &err {
        Error::Packaging(message) => {
            assert!(message.contains(&skeleton.display().to_string()));
            assert!(message.contains("dpkg-deb: error: broken"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(pipeline.stage(), Stage::BinariesBuilt);

    assert!(skeleton.join("DEBIAN/control").is_file());
    assert!(skeleton.join("DEBIAN/md5sums").is_file());
    assert!(skeleton.join("usr/bin/dil1").is_file());
    assert!(!tree.build.join("dil.1.042.tmp").exists());
    assert!(!tree.build.join("dil_1.042-1_i386.deb").exists());

    Ok(())
}
