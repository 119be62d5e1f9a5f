//! Named build steps and their overrides.
//!
//! The build procedure runs [`STANDARD_COMMANDS`] in order. A package can
//! replace any of them through [`CommandOverrides`], which is how protocol
//! compilation is plugged in.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::descriptor::PackageDescriptor;
use crate::error::PackagingError;

pub const EMIT_METADATA: &str = "emit_metadata";
pub const COMPILE_PROTOS: &str = "compile_protos";

/// Commands of the standard build procedure, in execution order.
pub const STANDARD_COMMANDS: &[&str] = &[EMIT_METADATA, COMPILE_PROTOS];

/// File name of the descriptor manifest written into `OUT_DIR`.
pub const DESCRIPTOR_MANIFEST: &str = "package-descriptor.json";

/// `rustc-env` keys exported to the package crate.
pub const ENV_VERSION: &str = "PROTO_PACKAGE_VERSION";
pub const ENV_NAMESPACE: &str = "PROTO_PACKAGE_NAMESPACE";
pub const ENV_NAME: &str = "PROTO_PACKAGE_NAME";
pub const ENV_DESCRIPTION: &str = "PROTO_PACKAGE_DESCRIPTION";

/// Inputs shared by every build command.
#[derive(Debug)]
pub struct BuildContext<'a> {
    pub descriptor: &'a PackageDescriptor,
    pub root: &'a Path,
    pub proto_root: &'a Path,
    pub readme: &'a Path,
    pub version_file: &'a Path,
    pub out_dir: &'a Path,
    /// Version Cargo was told about, if any.
    pub cargo_pkg_version: Option<&'a str>,
}

/// One step of the build procedure.
pub trait BuildCommand {
    /// Run the step; Cargo directives go to `out`.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole build.
    fn run(&self, ctx: &BuildContext<'_>, out: &mut dyn Write) -> Result<(), PackagingError>;
}

/// Command name to replacement step.
#[derive(Default)]
pub struct CommandOverrides {
    commands: BTreeMap<String, Box<dyn BuildCommand>>,
}

impl CommandOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the step registered under `name`.
    #[must_use]
    pub fn with(mut self, name: &str, command: impl BuildCommand + 'static) -> Self {
        self.commands.insert(name.to_owned(), Box::new(command));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn BuildCommand> {
        self.commands
            .get(name)
            .map(|command| &**command as &dyn BuildCommand)
    }

    #[must_use]
    pub fn is_overridden(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

impl fmt::Debug for CommandOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOverrides")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Default `emit_metadata`: Cargo directives plus the descriptor manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitMetadata;

impl BuildCommand for EmitMetadata {
    fn run(&self, ctx: &BuildContext<'_>, out: &mut dyn Write) -> Result<(), PackagingError> {
        let d = ctx.descriptor;
        let directives = [
            format!("cargo:rerun-if-changed={}", ctx.readme.display()),
            format!("cargo:rerun-if-changed={}", ctx.version_file.display()),
            format!("cargo:rerun-if-changed={}", ctx.proto_root.display()),
            format!("cargo:rerun-if-env-changed={}", crate::timestamp::SOURCE_DATE_EPOCH),
            format!("cargo:rustc-env={ENV_VERSION}={}", d.version),
            format!("cargo:rustc-env={ENV_NAMESPACE}={}", d.namespace),
            format!("cargo:rustc-env={ENV_NAME}={}", d.name),
            format!("cargo:rustc-env={ENV_DESCRIPTION}={}", d.description),
        ];
        for line in &directives {
            writeln!(out, "{line}").map_err(|e| PackagingError::from_io("<cargo directives>", e))?;
        }

        if let Some(cargo_version) = ctx.cargo_pkg_version
            && cargo_version != d.version.as_str()
        {
            tracing::warn!(
                cargo = cargo_version,
                version_file = %d.version,
                "Cargo package version differs from VERSION file"
            );
            writeln!(
                out,
                "cargo:warning=Cargo.toml version {cargo_version} differs from VERSION file {}",
                d.version
            )
            .map_err(|e| PackagingError::from_io("<cargo directives>", e))?;
        }

        let manifest = ctx.out_dir.join(DESCRIPTOR_MANIFEST);
        std::fs::write(&manifest, d.to_manifest_json()?)
            .map_err(|e| PackagingError::from_io(&manifest, e))?;
        tracing::debug!(path = %manifest.display(), "Wrote descriptor manifest");
        Ok(())
    }
}

/// Default `compile_protos`: package data is shipped as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipProtoCompilation;

impl BuildCommand for SkipProtoCompilation {
    fn run(&self, ctx: &BuildContext<'_>, _out: &mut dyn Write) -> Result<(), PackagingError> {
        tracing::info!(
            package = %ctx.descriptor.name,
            protos = ctx.descriptor.proto_files().count(),
            "No proto compiler configured, skipping code generation"
        );
        Ok(())
    }
}

/// `compile_protos` override generating client and server stubs with
/// `tonic-prost-build`.
#[cfg(feature = "tonic-codegen")]
#[derive(Debug, Clone, Copy)]
pub struct TonicCompileProtos {
    pub build_client: bool,
    pub build_server: bool,
}

#[cfg(feature = "tonic-codegen")]
impl Default for TonicCompileProtos {
    fn default() -> Self {
        Self {
            build_client: true,
            build_server: true,
        }
    }
}

#[cfg(feature = "tonic-codegen")]
impl BuildCommand for TonicCompileProtos {
    fn run(&self, ctx: &BuildContext<'_>, _out: &mut dyn Write) -> Result<(), PackagingError> {
        let protos = proto_sources(ctx);
        if protos.is_empty() {
            tracing::warn!(package = %ctx.descriptor.name, "No .proto files to compile");
            return Ok(());
        }

        let descriptor_set = ctx.out_dir.join(format!(
            "{}_descriptor.bin",
            ctx.descriptor.proto_package.segments().join("_")
        ));

        tonic_prost_build::configure()
            .out_dir(ctx.out_dir)
            .file_descriptor_set_path(descriptor_set)
            .build_client(self.build_client)
            .build_server(self.build_server)
            .emit_rerun_if_changed(true)
            .compile_protos(protos.as_slice(), &[ctx.proto_root.to_path_buf()])
            .map_err(|e| PackagingError::Command {
                command: COMPILE_PROTOS.to_owned(),
                message: e.to_string(),
            })?;

        tracing::info!(count = protos.len(), "Compiled proto sources");
        Ok(())
    }
}

/// Absolute paths of the `.proto` package data.
#[must_use]
pub fn proto_sources(ctx: &BuildContext<'_>) -> Vec<PathBuf> {
    ctx.descriptor
        .proto_files()
        .map(|p| ctx.proto_root.join(p))
        .collect()
}
