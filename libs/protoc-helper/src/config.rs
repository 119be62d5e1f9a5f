//! Package configuration.
//!
//! Layering follows the usual order: defaults, then an optional YAML file,
//! then `PROTOC_HELPER_*` environment variables (`__` separates nested keys).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::PackagingError;
use crate::namespace::Namespace;

/// Prefix of environment variables that override package configuration.
pub const ENV_PREFIX: &str = "PROTOC_HELPER_";

/// Inputs of the distribution builder for one API package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Leading namespace segments shared by every API package.
    pub namespace_root: Vec<String>,
    pub product: String,
    pub library: String,
    /// Version segment of the generated protobuf package (e.g. `v1`).
    pub api_version: String,
    /// Overrides the name derived from the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    pub author: String,
    pub author_email: String,
    pub license: String,
    /// Compiler compatibility constraint, as a semver requirement.
    pub rust_version: String,
    /// Runtime dependency name to version requirement.
    pub dependencies: BTreeMap<String, String>,
    /// Dotted glob restricting namespace package discovery.
    pub include: String,
    /// File-name globs shipped as package data.
    pub data_patterns: Vec<String>,
    pub readme: PathBuf,
    /// Directory, relative to the package root, holding the namespace tree.
    pub proto_root: PathBuf,
    pub homepage_base: String,
}

impl PackageConfig {
    /// Defaults for `ansys-api-<product>-<library>`.
    #[must_use]
    pub fn for_library(product: &str, library: &str) -> Self {
        Self {
            namespace_root: vec!["ansys".to_owned(), "api".to_owned()],
            product: product.to_owned(),
            library: library.to_owned(),
            api_version: "v1".to_owned(),
            package_name: None,
            author: "ANSYS, Inc.".to_owned(),
            author_email: "support@ansys.com".to_owned(),
            license: "MIT".to_owned(),
            rust_version: ">=1.92".to_owned(),
            dependencies: BTreeMap::from([
                ("prost".to_owned(), "^0.14".to_owned()),
                ("tonic".to_owned(), "^0.14".to_owned()),
            ]),
            include: "ansys.*".to_owned(),
            data_patterns: vec![
                "*.proto".to_owned(),
                "*.pyi".to_owned(),
                "py.typed".to_owned(),
                "VERSION".to_owned(),
            ],
            readme: PathBuf::from("README.md"),
            proto_root: PathBuf::from("proto"),
            homepage_base: "https://github.com/ansys".to_owned(),
        }
    }

    /// Layer `file` (if it exists) and the environment over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::Config`] if the merged values do not
    /// deserialize into a `PackageConfig`.
    pub fn load(base: &Self, file: Option<&Path>) -> Result<Self, PackagingError> {
        let mut figment = Figment::new().merge(Serialized::defaults(base));
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Merging package config file");
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract()?;
        Ok(config)
    }

    /// The dotted namespace `<namespace_root>.<product>.<library>`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidNamespace`] if any segment is malformed.
    pub fn namespace(&self) -> Result<Namespace, PackagingError> {
        Namespace::from_segments(
            self.namespace_root
                .iter()
                .map(String::as_str)
                .chain([self.product.as_str(), self.library.as_str()]),
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_compose_instancemanagement_namespace() {
        let config = PackageConfig::for_library("platform", "instancemanagement");
        assert_eq!(
            config.namespace().unwrap().dotted(),
            "ansys.api.platform.instancemanagement"
        );
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let base = PackageConfig::for_library("platform", "instancemanagement");

        temp_env::with_vars_unset(["PROTOC_HELPER_LICENSE", "PROTOC_HELPER_LIBRARY"], || {
            let loaded = PackageConfig::load(&base, Some(&dir.path().join("package.yaml"))).unwrap();
            assert_eq!(loaded, base);
        });
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.yaml");
        std::fs::write(
            &path,
            "library: licensing\ndependencies:\n  tonic: \"^0.15\"\n",
        )
        .unwrap();
        let base = PackageConfig::for_library("platform", "instancemanagement");

        temp_env::with_vars_unset(["PROTOC_HELPER_LIBRARY"], || {
            let loaded = PackageConfig::load(&base, Some(&path)).unwrap();
            assert_eq!(loaded.library, "licensing");
            assert_eq!(loaded.dependencies["tonic"], "^0.15");
            assert_eq!(loaded.dependencies["prost"], "^0.14");
            assert_eq!(loaded.author, "ANSYS, Inc.");
        });
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.yaml");
        std::fs::write(&path, "license: Apache-2.0\n").unwrap();
        let base = PackageConfig::for_library("platform", "instancemanagement");

        temp_env::with_var("PROTOC_HELPER_LICENSE", Some("BSD-3-Clause"), || {
            let loaded = PackageConfig::load(&base, Some(&path)).unwrap();
            assert_eq!(loaded.license, "BSD-3-Clause");
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.yaml");
        std::fs::write(&path, "python_requires: \">=3.7\"\n").unwrap();
        let base = PackageConfig::for_library("platform", "instancemanagement");

        let stray: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with("PROTOC_HELPER_"))
            .collect();

        temp_env::with_vars_unset(stray, || {
            let err = PackageConfig::load(&base, Some(&path)).unwrap_err();
            assert!(matches!(err, PackagingError::Config(_)), "unexpected error: {err}");
        });
    }
}
