//! Product metadata written into packages and documents.

use serde::Deserialize;

/// Product metadata.
///
/// Defaults describe DIL itself. A `[package]` table in the file passed via
/// `--config` overrides individual fields:
///
/// ```toml
/// [package]
/// maintainer = "Jane Doe <jane@example.com>"
/// homepage = "https://example.com/dil"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSettings {
    /// Product name. Also the file name prefix of every packaged payload file
    /// and of binary names (`dil1`, `dilconf.d`).
    pub product_name: String,

    /// Debian `Maintainer` field.
    ///
    /// Format: "Name <email@example.com>"
    pub maintainer: String,

    /// Author shown in generated documents.
    pub author: String,

    /// Homepage URL.
    pub homepage: String,

    /// Issue tracker URL (Debian `Bugs` field).
    pub bugs: String,

    /// Debian control file section.
    pub section: String,

    /// Debian package priority.
    pub priority: String,

    /// Virtual packages provided.
    pub provides: Vec<String>,

    /// Package dependencies in Debian syntax.
    pub depends: Vec<String>,

    /// One-line description.
    pub short_description: String,

    /// Extended description, one paragraph.
    pub long_description: String,

    /// Base URL of the online API docs used for symbol cross references in
    /// the PDF. `{0}` is replaced with the version.
    pub symbol_url: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            product_name: "dil".into(),
            maintainer: "Aziz Köksal <aziz.koeksal@gmail.com>".into(),
            author: "Aziz Köksal".into(),
            homepage: "http://code.google.com/p/dil".into(),
            bugs: "https://github.com/azizk/dil/issues".into(),
            section: "devel".into(),
            priority: "optional".into(),
            provides: vec!["d-compiler".into()],
            depends: Vec::new(),
            short_description: "D compiler".into(),
            long_description: "DIL is a feature-rich compiler for the D programming language \
                               written entirely in D."
                .into(),
            symbol_url: "http://dl.dropbox.com/u/17101773/doc/dil/{0}".into(),
        }
    }
}

impl PackageSettings {
    /// Symbol cross-reference URL for a given version.
    pub fn symbol_url_for(&self, version: &str) -> String {
        self.symbol_url.replace("{0}", version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let settings: PackageSettings =
            toml::from_str("maintainer = \"Jane <jane@example.com>\"").unwrap();
        assert_eq!(settings.maintainer, "Jane <jane@example.com>");
        assert_eq!(settings.product_name, "dil");
        assert_eq!(settings.provides, vec!["d-compiler".to_string()]);
    }

    #[test]
    fn symbol_url_substitutes_version() {
        let settings = PackageSettings::default();
        assert!(settings.symbol_url_for("1.042").ends_with("/dil/1.042"));
    }
}
