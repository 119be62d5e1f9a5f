#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Packaging helper for Ansys gRPC API crates.
//!
//! An API crate ships `.proto` sources plus a `VERSION` file and calls
//! [`build_script::emit`] from its `build.rs`. That composes a
//! [`PackageDescriptor`], exports the version to the crate and, when an
//! override is installed, compiles the protos. At runtime the crate registers
//! itself with [`register_proto_provider!`] so host tools can find its
//! sources through [`ProviderRegistry`].

pub mod build_script;
pub mod commands;
pub mod config;
pub mod descriptor;
pub mod distribution;
pub mod error;
pub mod namespace;
pub mod registry;
pub mod timestamp;
pub mod version;

pub use commands::{BuildCommand, BuildContext, CommandOverrides};
pub use config::PackageConfig;
pub use descriptor::{Author, Dependency, PROTO_PROVIDER_GROUP, PackageDescriptor};
pub use distribution::DistributionBuilder;
pub use error::{PackagingError, RegistryError};
pub use namespace::Namespace;
pub use registry::{ProtoProvider, ProviderManifest, ProviderRegistry, RegisteredProvider};
pub use timestamp::BuildTimestamp;
pub use version::{VERSION_FILE_NAME, VersionString, read_version_file, resolve_version};

#[cfg(feature = "tonic-codegen")]
pub use commands::TonicCompileProtos;

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
