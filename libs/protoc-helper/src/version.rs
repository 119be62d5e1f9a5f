//! Version resolution from co-located `VERSION` files.
//!
//! A package keeps its release version in a plain-text `VERSION` file next to
//! its `.proto` sources. The build script and the runtime crate both go
//! through [`read_version_file`], so they always agree on the value.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PackagingError;

/// File name of the single source-of-truth release version.
pub const VERSION_FILE_NAME: &str = "VERSION";

/// A trimmed, non-empty semantic version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionString {
    raw: String,
    parsed: semver::Version,
}

impl VersionString {
    /// Parse a version, stripping surrounding whitespace first.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidVersion`] if the trimmed value is not
    /// a semantic version (this includes the empty string).
    pub fn parse(value: &str) -> Result<Self, PackagingError> {
        let raw = value.trim();
        let parsed =
            semver::Version::parse(raw).map_err(|source| PackagingError::InvalidVersion {
                value: raw.to_owned(),
                source,
            })?;
        Ok(Self {
            raw: raw.to_owned(),
            parsed,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn semver(&self) -> &semver::Version {
        &self.parsed
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionString {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionString {
    type Error = PackagingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionString> for String {
    fn from(value: VersionString) -> Self {
        value.raw
    }
}

impl AsRef<str> for VersionString {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Read a `VERSION` file and return its trimmed content.
///
/// # Errors
///
/// - [`PackagingError::FileNotFound`] if the file does not exist
/// - [`PackagingError::Io`] if it cannot be read as UTF-8 text
/// - [`PackagingError::EmptyVersion`] if it holds only whitespace
/// - [`PackagingError::InvalidVersion`] if the content is not a semantic version
pub fn read_version_file(path: &Path) -> Result<VersionString, PackagingError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| PackagingError::from_io(path, e))?;

    if content.trim().is_empty() {
        return Err(PackagingError::EmptyVersion {
            path: path.to_path_buf(),
        });
    }

    let version = VersionString::parse(&content)?;
    tracing::debug!(path = %path.display(), version = %version, "Resolved package version");
    Ok(version)
}

/// Resolve the version stored in `namespace_dir/VERSION`.
///
/// # Errors
///
/// Same as [`read_version_file`].
pub fn resolve_version(namespace_dir: &Path) -> Result<VersionString, PackagingError> {
    read_version_file(&namespace_dir.join(VERSION_FILE_NAME))
}
