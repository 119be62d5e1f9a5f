//! Dotted namespace paths shared by packages, directories and registry keys.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PackagingError;

/// A dotted namespace such as `ansys.api.platform.instancemanagement`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// Build a namespace from segments, dropping empty ones.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidNamespace`] if no segment remains or a
    /// segment is not a lowercase identifier.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PackagingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(PackagingError::InvalidNamespace {
                value: String::new(),
                reason: "namespace has no segments".to_owned(),
            });
        }

        for segment in &segments {
            validate_segment(segment).map_err(|reason| PackagingError::InvalidNamespace {
                value: segments.join("."),
                reason,
            })?;
        }

        Ok(Self { segments })
    }

    /// Parse a dotted namespace string.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidNamespace`] on empty or malformed segments.
    pub fn parse(dotted: &str) -> Result<Self, PackagingError> {
        if dotted.split('.').any(str::is_empty) {
            return Err(PackagingError::InvalidNamespace {
                value: dotted.to_owned(),
                reason: "empty segment".to_owned(),
            });
        }
        Self::from_segments(dotted.split('.'))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Distribution name: segments joined with `-`.
    #[must_use]
    pub fn package_name(&self) -> String {
        self.segments.join("-")
    }

    /// Directory of this namespace below `root`.
    #[must_use]
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        self.segments.iter().fold(root.to_path_buf(), |p, s| p.join(s))
    }

    /// Protobuf package of a versioned API below this namespace (`<ns>.v1`).
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidNamespace`] if `api_version` is not a
    /// valid segment.
    pub fn proto_package(&self, api_version: &str) -> Result<Self, PackagingError> {
        Self::from_segments(self.segments.iter().map(String::as_str).chain([api_version]))
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &Namespace) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

fn validate_segment(segment: &str) -> Result<(), String> {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return Err(format!("segment '{segment}' must start with a lowercase letter")),
    }
    if chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        Ok(())
    } else {
        Err(format!(
            "segment '{segment}' may only contain lowercase letters, digits and '_'"
        ))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl FromStr for Namespace {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = PackagingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.dotted()
    }
}
