//! Package metadata from the `--config` file

use crate::error::{CliError, Result};
use crate::release::PackageSettings;
use serde::Deserialize;
use std::path::Path;

/// Layout of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    package: PackageSettings,
}

/// Parses a config file's text. Fields absent from `[package]` keep their
/// defaults.
pub fn parse_config(text: &str, path: &Path) -> Result<PackageSettings> {
    let config: ConfigFile = toml::from_str(text).map_err(|e| CliError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let package = config.package;
    if package.product_name.is_empty() {
        return Err(CliError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "package.product_name must not be empty".into(),
        }
        .into());
    }
    Ok(package)
}

/// Loads package metadata from `path`.
pub fn load_config(path: &Path) -> Result<PackageSettings> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_single_fields() {
        let settings = parse_config(
            r#"
[package]
maintainer = "Jane Doe <jane@example.com>"
depends = ["libc6"]
"#,
            Path::new("release.toml"),
        )
        .unwrap();
        assert_eq!(settings.maintainer, "Jane Doe <jane@example.com>");
        assert_eq!(settings.depends, ["libc6"]);
        assert_eq!(settings.product_name, "dil");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse_config("", Path::new("release.toml")).unwrap();
        assert_eq!(settings, PackageSettings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config("[package]\nmaintainr = \"x\"\n", Path::new("r.toml")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
