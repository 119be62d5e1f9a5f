//! Composition of the [`PackageDescriptor`] for an API package tree.
//!
//! A package tree looks like:
//!
//! ```text
//! <root>/
//!   README.md
//!   proto/
//!     ansys/api/<product>/<library>/
//!       VERSION
//!       v1/*.proto
//! ```

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::PackageConfig;
use crate::descriptor::{Author, Dependency, MARKDOWN_CONTENT_TYPE, PackageDescriptor};
use crate::error::PackagingError;
use crate::namespace::Namespace;
use crate::timestamp::BuildTimestamp;
use crate::version::{VERSION_FILE_NAME, VersionString, read_version_file};

/// Builds the descriptor of the package rooted at `root`.
#[derive(Debug, Clone)]
pub struct DistributionBuilder {
    root: PathBuf,
    config: PackageConfig,
}

impl DistributionBuilder {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: PackageConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    #[must_use]
    pub fn proto_root(&self) -> PathBuf {
        self.root.join(&self.config.proto_root)
    }

    #[must_use]
    pub fn readme_path(&self) -> PathBuf {
        self.root.join(&self.config.readme)
    }

    /// Location of the package's `VERSION` file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::InvalidNamespace`] if the configured
    /// namespace is malformed.
    pub fn version_path(&self) -> Result<PathBuf, PackagingError> {
        Ok(self
            .config
            .namespace()?
            .dir_in(&self.proto_root())
            .join(VERSION_FILE_NAME))
    }

    /// Compose the descriptor, stamping the description with `timestamp`.
    ///
    /// The README and the `VERSION` file are read first; if either is missing
    /// nothing else is computed.
    ///
    /// # Errors
    ///
    /// - [`PackagingError::FileNotFound`] if the README or `VERSION` file is absent
    /// - any validation error of the version, namespace, dependencies or globs
    pub fn build(&self, timestamp: BuildTimestamp) -> Result<PackageDescriptor, PackagingError> {
        let readme = self.readme_path();
        let long_description =
            std::fs::read_to_string(&readme).map_err(|e| PackagingError::from_io(&readme, e))?;

        let namespace = self.config.namespace()?;
        let version = read_version_file(&self.version_path()?)?;

        let name = self
            .config
            .package_name
            .clone()
            .unwrap_or_else(|| namespace.package_name());

        let descriptor = PackageDescriptor {
            description: describe(&name, timestamp),
            long_description,
            long_description_content_type: MARKDOWN_CONTENT_TYPE.to_owned(),
            url: format!(
                "{}/{name}",
                self.config.homepage_base.trim_end_matches('/')
            ),
            author: Author {
                name: self.config.author.clone(),
                email: self.config.author_email.clone(),
            },
            license: self.config.license.clone(),
            rust_version: self.rust_version()?,
            dependencies: self.dependencies()?,
            packages: self.discover_packages()?,
            data_patterns: self.config.data_patterns.clone(),
            data_files: self.discover_data_files()?,
            entry_points: PackageDescriptor::proto_provider_entry(&namespace),
            proto_package: namespace.proto_package(&self.config.api_version)?,
            version,
            namespace,
            name,
        };

        tracing::info!(
            package = %descriptor.name,
            version = %descriptor.version,
            namespace = %descriptor.namespace,
            packages = descriptor.packages.len(),
            data_files = descriptor.data_files.len(),
            "Composed package descriptor"
        );
        Ok(descriptor)
    }

    /// Read only the package version, through the same path as [`Self::build`].
    ///
    /// # Errors
    ///
    /// See [`read_version_file`].
    pub fn version(&self) -> Result<VersionString, PackagingError> {
        read_version_file(&self.version_path()?)
    }

    fn rust_version(&self) -> Result<String, PackagingError> {
        Dependency::new("rust", &self.config.rust_version).map(|d| d.requirement)
    }

    fn dependencies(&self) -> Result<Vec<Dependency>, PackagingError> {
        self.config
            .dependencies
            .iter()
            .map(|(name, req)| Dependency::new(name, req))
            .collect()
    }

    /// Namespace packages below the proto root whose dotted path matches the
    /// include glob, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::Pattern`] for a bad include glob and
    /// [`PackagingError::Walk`] if the tree cannot be traversed.
    pub fn discover_packages(&self) -> Result<Vec<Namespace>, PackagingError> {
        let include = compile_pattern(&self.config.include)?;
        let proto_root = self.proto_root();
        let mut packages = Vec::new();

        for entry in WalkDir::new(&proto_root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| PackagingError::Walk {
                path: proto_root.clone(),
                source,
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&proto_root) else {
                continue;
            };
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            // Directories that are not valid identifiers are not packages.
            let Ok(namespace) = Namespace::from_segments(&segments) else {
                tracing::debug!(path = %relative.display(), "Skipping non-package directory");
                continue;
            };
            if include.matches(&namespace.dotted()) {
                packages.push(namespace);
            }
        }

        packages.sort();
        Ok(packages)
    }

    /// Files inside discovered packages whose file name matches one of the
    /// data patterns, relative to the proto root and sorted.
    ///
    /// # Errors
    ///
    /// Same as [`Self::discover_packages`].
    pub fn discover_data_files(&self) -> Result<Vec<PathBuf>, PackagingError> {
        let patterns = self
            .config
            .data_patterns
            .iter()
            .map(String::as_str)
            .map(compile_pattern)
            .collect::<Result<Vec<_>, _>>()?;
        let proto_root = self.proto_root();
        let mut files = Vec::new();

        for package in self.discover_packages()? {
            let dir = package.dir_in(&proto_root);
            for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
                let entry = entry.map_err(|source| PackagingError::Walk {
                    path: dir.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let file_name = entry.file_name().to_string_lossy();
                if patterns.iter().any(|p| p.matches(&file_name))
                    && let Ok(relative) = entry.path().strip_prefix(&proto_root)
                {
                    files.push(relative.to_path_buf());
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

/// Human-readable summary embedding the package name and build time.
#[must_use]
pub fn describe(package_name: &str, timestamp: BuildTimestamp) -> String {
    format!("Autogenerated Rust gRPC interface package for {package_name}, built on {timestamp}")
}

fn compile_pattern(pattern: &str) -> Result<Pattern, PackagingError> {
    Pattern::new(pattern).map_err(|source| PackagingError::Pattern {
        pattern: pattern.to_owned(),
        source,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> BuildTimestamp {
        BuildTimestamp::new(
            NaiveDate::from_ymd_opt(2024, 11, 5)
                .unwrap()
                .and_hms_opt(hour, 30, 0)
                .unwrap(),
        )
    }

    #[test]
    fn description_embeds_package_and_time() {
        let text = describe("ansys-api-platform-instancemanagement", at(14));
        assert_eq!(
            text,
            "Autogenerated Rust gRPC interface package for \
             ansys-api-platform-instancemanagement, built on 14:30:00 on 05 November 2024"
        );
    }

    #[test]
    fn version_path_follows_namespace() {
        let builder = DistributionBuilder::new(
            "/src/pkg",
            PackageConfig::for_library("platform", "instancemanagement"),
        );
        assert_eq!(
            builder.version_path().unwrap(),
            Path::new("/src/pkg/proto/ansys/api/platform/instancemanagement/VERSION")
        );
    }

    #[test]
    fn bad_include_glob_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PackageConfig::for_library("platform", "instancemanagement");
        config.include = "ansys.[".to_owned();

        let err = DistributionBuilder::new(dir.path(), config)
            .discover_packages()
            .unwrap_err();
        assert!(matches!(err, PackagingError::Pattern { .. }));
    }
}
