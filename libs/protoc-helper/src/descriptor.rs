//! The package descriptor composed by the distribution builder.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PackagingError;
use crate::namespace::Namespace;
use crate::version::VersionString;

/// Extension point under which API packages advertise their `.proto` sources.
pub const PROTO_PROVIDER_GROUP: &str = "ansys.tools.protoc_helper.proto_provider";

/// Content type of the long description (the README).
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// A runtime dependency and its accepted version range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub requirement: String,
}

impl Dependency {
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidRequirement`] if `requirement` is not a
    /// semver requirement.
    pub fn new(name: &str, requirement: &str) -> Result<Self, PackagingError> {
        semver::VersionReq::parse(requirement).map_err(|source| {
            PackagingError::InvalidRequirement {
                name: name.to_owned(),
                requirement: requirement.to_owned(),
                source,
            }
        })?;
        Ok(Self {
            name: name.to_owned(),
            requirement: requirement.to_owned(),
        })
    }
}

/// Extension group name to `entry name -> target`.
pub type EntryPoints = BTreeMap<String, BTreeMap<String, String>>;

/// Everything the build hands to the packaging toolchain for one package.
///
/// Recomputed on every build and never persisted outside the build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub namespace: Namespace,
    /// Protobuf package of the generated stubs (`<namespace>.<api_version>`).
    pub proto_package: Namespace,
    pub version: VersionString,
    pub author: Author,
    pub license: String,
    pub description: String,
    pub long_description: String,
    pub long_description_content_type: String,
    pub url: String,
    pub rust_version: String,
    pub dependencies: Vec<Dependency>,
    /// Namespace packages found under the proto root.
    pub packages: Vec<Namespace>,
    pub data_patterns: Vec<String>,
    /// Matched package data, relative to the proto root.
    pub data_files: Vec<PathBuf>,
    pub entry_points: EntryPoints,
}

impl PackageDescriptor {
    /// Self-registration entry: the namespace mapped to itself.
    #[must_use]
    pub fn proto_provider_entry(namespace: &Namespace) -> EntryPoints {
        let dotted = namespace.dotted();
        BTreeMap::from([(
            PROTO_PROVIDER_GROUP.to_owned(),
            BTreeMap::from([(dotted.clone(), dotted)]),
        )])
    }

    /// The `(entry, target)` pair registered under [`PROTO_PROVIDER_GROUP`].
    #[must_use]
    pub fn proto_provider(&self) -> Option<(&str, &str)> {
        self.entry_points
            .get(PROTO_PROVIDER_GROUP)?
            .iter()
            .next()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `.proto` files among the package data.
    pub fn proto_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.data_files
            .iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "proto"))
    }

    /// Pretty JSON manifest written into the build output.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::Serialize`] if serialization fails.
    pub fn to_manifest_json(&self) -> Result<String, PackagingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns [`PackagingError::Serialize`] if `json` is not a descriptor.
    pub fn from_manifest_json(json: &str) -> Result<Self, PackagingError> {
        Ok(serde_json::from_str(json)?)
    }
}
