//! Release version parsing.

use crate::release::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::{fmt, str::FromStr, sync::LazyLock};

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d)\.(\d{3})(-\w+)?$").expect("version pattern is valid")
});

/// A release version of the form `MAJOR.MINOR[-SUFFIX]`, e.g. `1.042` or
/// `2.007-beta`.
///
/// The minor part is always written with three digits; its numeric value is
/// what gets stamped into the sources (`042` becomes `42`). The suffix keeps
/// its leading dash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Version {
    major: u32,
    minor: u32,
    suffix: String,
    #[serde(rename = "version")]
    text: String,
}

impl Version {
    /// Parses and validates a version string.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = VERSION_RE
            .captures(text)
            .ok_or_else(|| Error::VersionFormat(text.to_string()))?;

        let number = |i: usize| -> Result<u32> {
            caps[i]
                .parse()
                .map_err(|_| Error::VersionFormat(text.to_string()))
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            suffix: caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
            text: text.to_string(),
        })
    }

    /// Major version number.
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Minor version number (numeric value, without zero padding).
    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// Suffix including the leading dash, or an empty string.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The version exactly as given on the command line.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
