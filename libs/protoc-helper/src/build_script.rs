//! Build-script entry point for API package crates.
//!
//! ```rust,ignore
//! // build.rs
//! use protoc_helper::{CommandOverrides, PackageConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     protoc_helper::build_script::emit(
//!         &PackageConfig::for_library("platform", "instancemanagement"),
//!         &CommandOverrides::new(),
//!     )
//! }
//! ```
//!
//! The package crate then reads its version with
//! `env!("PROTO_PACKAGE_VERSION")` and its descriptor from
//! `concat!(env!("OUT_DIR"), "/package-descriptor.json")`.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::commands::{
    BuildCommand, BuildContext, COMPILE_PROTOS, CommandOverrides, EMIT_METADATA, EmitMetadata,
    STANDARD_COMMANDS, SkipProtoCompilation,
};
use crate::config::PackageConfig;
use crate::descriptor::PackageDescriptor;
use crate::distribution::DistributionBuilder;
use crate::error::PackagingError;
use crate::timestamp::BuildTimestamp;

/// Optional per-package configuration file next to `Cargo.toml`.
pub const PACKAGE_CONFIG_FILE: &str = "package.yaml";

/// One run of the build procedure for a package.
#[derive(Debug, Clone)]
pub struct BuildScript {
    builder: DistributionBuilder,
    out_dir: PathBuf,
    cargo_pkg_version: Option<String>,
    timestamp: BuildTimestamp,
}

impl BuildScript {
    #[must_use]
    pub fn new(builder: DistributionBuilder, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            out_dir: out_dir.into(),
            cargo_pkg_version: None,
            timestamp: BuildTimestamp::from_env_or_now(),
        }
    }

    /// Configure from the variables Cargo sets for build scripts.
    ///
    /// # Errors
    ///
    /// - [`PackagingError::MissingEnv`] outside a Cargo build script
    /// - [`PackagingError::Config`] if `package.yaml` or the environment is invalid
    pub fn from_cargo_env(base: &PackageConfig) -> Result<Self, PackagingError> {
        let manifest_dir = PathBuf::from(
            std::env::var_os("CARGO_MANIFEST_DIR")
                .ok_or(PackagingError::MissingEnv("CARGO_MANIFEST_DIR"))?,
        );
        let out_dir =
            std::env::var_os("OUT_DIR").ok_or(PackagingError::MissingEnv("OUT_DIR"))?;

        let config_file = manifest_dir.join(PACKAGE_CONFIG_FILE);
        let config = PackageConfig::load(base, Some(&config_file))?;

        let script = Self::new(DistributionBuilder::new(manifest_dir, config), out_dir);
        Ok(match std::env::var("CARGO_PKG_VERSION") {
            Ok(version) => script.with_cargo_pkg_version(version),
            Err(_) => script,
        })
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: BuildTimestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_cargo_pkg_version(mut self, version: impl Into<String>) -> Self {
        self.cargo_pkg_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn builder(&self) -> &DistributionBuilder {
        &self.builder
    }

    /// Compose the descriptor and run every standard command, preferring
    /// `overrides`. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Any error of [`DistributionBuilder::build`] or of a build command.
    pub fn run(
        &self,
        overrides: &CommandOverrides,
        out: &mut dyn Write,
    ) -> Result<PackageDescriptor, PackagingError> {
        let descriptor = self.builder.build(self.timestamp)?;
        let proto_root = self.builder.proto_root();
        let readme = self.builder.readme_path();
        let version_file = self.builder.version_path()?;
        let config_file = self.builder.root().join(PACKAGE_CONFIG_FILE);

        if config_file.is_file() {
            writeln!(out, "cargo:rerun-if-changed={}", config_file.display())
                .map_err(|e| PackagingError::from_io("<cargo directives>", e))?;
        }

        let ctx = BuildContext {
            descriptor: &descriptor,
            root: self.builder.root(),
            proto_root: &proto_root,
            readme: &readme,
            version_file: &version_file,
            out_dir: &self.out_dir,
            cargo_pkg_version: self.cargo_pkg_version.as_deref(),
        };

        let defaults: [(&str, &dyn BuildCommand); 2] = [
            (EMIT_METADATA, &EmitMetadata),
            (COMPILE_PROTOS, &SkipProtoCompilation),
        ];
        for (name, default) in defaults {
            let command = overrides.get(name).unwrap_or(default);
            tracing::debug!(
                command = name,
                overridden = overrides.is_overridden(name),
                "Running build command"
            );
            command.run(&ctx, out)?;
        }

        for name in overrides.names() {
            if !STANDARD_COMMANDS.contains(&name) {
                tracing::warn!(command = name, "Ignoring override for unknown build command");
            }
        }

        Ok(descriptor)
    }

    /// Directory the build writes its artifacts into.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

/// Run the build procedure from a Cargo build script, writing directives to
/// stdout.
///
/// # Errors
///
/// Returns the first failure; the build script should propagate it so Cargo
/// aborts the build.
pub fn emit(
    base: &PackageConfig,
    overrides: &CommandOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = BuildScript::from_cargo_env(base)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    script.run(overrides, &mut out)?;
    Ok(())
}
