//! Ansys platform instance management API.
//!
//! This crate only distributes the `.proto` definitions of the
//! `ansys.api.platform.instancemanagement` namespace, its release version and,
//! with the `grpc` feature, the tonic stubs generated from them.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::path::Path;

use protoc_helper::{PackageDescriptor, PackagingError, VersionString};

/// Release version, read from the `VERSION` file by the build script.
pub const VERSION: &str = env!("PROTO_PACKAGE_VERSION");

/// Dotted namespace this crate provides protos for.
pub const NAMESPACE: &str = env!("PROTO_PACKAGE_NAMESPACE");

/// Distribution name.
pub const PACKAGE_NAME: &str = env!("PROTO_PACKAGE_NAME");

/// Human-readable summary stamped at build time.
pub const DESCRIPTION: &str = env!("PROTO_PACKAGE_DESCRIPTION");

/// Include root holding the `ansys/...` tree of `.proto` files.
pub const PROTO_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/proto");

const DESCRIPTOR_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/package-descriptor.json"));

protoc_helper::register_proto_provider! {
    namespace: NAMESPACE,
    package: PACKAGE_NAME,
    version: VERSION,
    proto_root: PROTO_ROOT,
}

/// Generated protobuf types and tonic stubs.
#[cfg(feature = "grpc")]
pub mod v1 {
    #![allow(clippy::pedantic)]
    tonic::include_proto!("ansys.api.platform.instancemanagement.v1");
}

#[cfg(feature = "grpc")]
pub use v1::product_instance_manager_client::ProductInstanceManagerClient;
#[cfg(feature = "grpc")]
pub use v1::product_instance_manager_server::{ProductInstanceManager, ProductInstanceManagerServer};

/// Service name used for discovery.
pub const SERVICE_NAME: &str =
    "ansys.api.platform.instancemanagement.v1.ProductInstanceManager";

/// [`VERSION`] as a parsed semantic version.
///
/// # Errors
///
/// Never fails for a crate that built: the build script validated the value.
pub fn version() -> Result<VersionString, PackagingError> {
    VersionString::parse(VERSION)
}

#[must_use]
pub fn proto_root() -> &'static Path {
    Path::new(PROTO_ROOT)
}

/// Re-read the shipped `VERSION` file.
///
/// # Errors
///
/// Returns [`PackagingError::FileNotFound`] if the sources were removed after
/// the build.
pub fn read_installed_version() -> Result<VersionString, PackagingError> {
    let namespace = protoc_helper::Namespace::parse(NAMESPACE)?;
    protoc_helper::resolve_version(&namespace.dir_in(proto_root()))
}

/// The descriptor the build composed for this crate.
///
/// # Errors
///
/// Returns [`PackagingError::Serialize`] if the embedded manifest is corrupt.
pub fn descriptor() -> Result<PackageDescriptor, PackagingError> {
    PackageDescriptor::from_manifest_json(DESCRIPTOR_JSON)
}
