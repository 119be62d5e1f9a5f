//! Static table of proto providers.
//!
//! Every API package crate registers itself once with
//! [`register_proto_provider!`](crate::register_proto_provider). A host tool
//! linking those crates calls [`ProviderRegistry::load`] at start-up, which
//! collects the table and validates it before anything consumes it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::PROTO_PROVIDER_GROUP;
use crate::error::{PackagingError, RegistryError};
use crate::namespace::Namespace;
use crate::version::VersionString;

/// A raw registration as submitted by a package crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoProvider {
    pub entry_name: &'static str,
    pub target: &'static str,
    /// Distribution name of the registering crate.
    pub package: &'static str,
    pub version: &'static str,
    /// Include root holding the namespace tree of `.proto` files.
    pub proto_root: &'static str,
}

inventory::collect!(ProtoProvider);

/// Register the calling crate as a proto provider for `namespace`.
///
/// ```rust,ignore
/// protoc_helper::register_proto_provider! {
///     namespace: "ansys.api.platform.instancemanagement",
///     package: env!("PROTO_PACKAGE_NAME"),
///     version: env!("PROTO_PACKAGE_VERSION"),
///     proto_root: concat!(env!("CARGO_MANIFEST_DIR"), "/proto"),
/// }
/// ```
#[macro_export]
macro_rules! register_proto_provider {
    (
        namespace: $namespace:expr,
        package: $package:expr,
        version: $version:expr,
        proto_root: $proto_root:expr $(,)?
    ) => {
        $crate::__private::inventory::submit! {
            $crate::ProtoProvider {
                entry_name: $namespace,
                target: $namespace,
                package: $package,
                version: $version,
                proto_root: $proto_root,
            }
        }
    };
}

/// A registration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredProvider {
    pub namespace: Namespace,
    pub package: String,
    pub version: VersionString,
    pub proto_root: PathBuf,
}

impl RegisteredProvider {
    fn validate(raw: &ProtoProvider) -> Result<Self, RegistryError> {
        if raw.entry_name != raw.target {
            return Err(RegistryError::NotSelfRegistered {
                entry: raw.entry_name.to_owned(),
                target: raw.target.to_owned(),
            });
        }
        let invalid = |source: PackagingError| RegistryError::Invalid {
            namespace: raw.entry_name.to_owned(),
            source,
        };
        Ok(Self {
            namespace: Namespace::parse(raw.entry_name).map_err(invalid)?,
            version: VersionString::parse(raw.version).map_err(invalid)?,
            package: raw.package.to_owned(),
            proto_root: PathBuf::from(raw.proto_root),
        })
    }

    /// Directory of this provider's namespace inside its proto root.
    #[must_use]
    pub fn namespace_dir(&self) -> PathBuf {
        self.namespace.dir_in(&self.proto_root)
    }
}

/// Validated proto providers, keyed and ordered by namespace.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<Namespace, RegisteredProvider>,
}

impl ProviderRegistry {
    /// Collect every provider linked into the current binary.
    ///
    /// # Errors
    ///
    /// See [`Self::from_providers`].
    pub fn load() -> Result<Self, RegistryError> {
        let registry = Self::from_providers(inventory::iter::<ProtoProvider>)?;
        tracing::info!(count = registry.len(), "Loaded proto providers");
        Ok(registry)
    }

    /// Validate an explicit list of registrations.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotSelfRegistered`] if an entry points elsewhere
    /// - [`RegistryError::Invalid`] for a malformed namespace or version
    /// - [`RegistryError::Duplicate`] if a namespace is registered twice
    pub fn from_providers<'a, I>(providers: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = &'a ProtoProvider>,
    {
        let mut registry = Self::default();
        for raw in providers {
            let provider = RegisteredProvider::validate(raw)?;
            if registry.providers.contains_key(&provider.namespace) {
                return Err(RegistryError::Duplicate {
                    namespace: provider.namespace.dotted(),
                });
            }
            tracing::debug!(
                namespace = %provider.namespace,
                package = %provider.package,
                version = %provider.version,
                "Registered proto provider"
            );
            registry
                .providers
                .insert(provider.namespace.clone(), provider);
        }
        Ok(registry)
    }

    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&RegisteredProvider> {
        let namespace = Namespace::parse(namespace).ok()?;
        self.providers.get(&namespace)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredProvider> {
        self.providers.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Distinct include roots, in namespace order.
    #[must_use]
    pub fn include_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = Vec::new();
        for provider in self.providers.values() {
            if !paths.contains(&provider.proto_root.as_path()) {
                paths.push(&provider.proto_root);
            }
        }
        paths
    }

    #[must_use]
    pub fn manifest(&self) -> ProviderManifest {
        ProviderManifest {
            group: PROTO_PROVIDER_GROUP.to_owned(),
            providers: self
                .providers
                .values()
                .map(|p| ManifestEntry {
                    entry: p.namespace.dotted(),
                    target: p.namespace.dotted(),
                    package: p.package.clone(),
                    version: p.version.to_string(),
                    proto_root: p.proto_root.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable view of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderManifest {
    pub group: String,
    pub providers: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub entry: String,
    pub target: String,
    pub package: String,
    pub version: String,
    pub proto_root: PathBuf,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const INSTANCE_MANAGEMENT: ProtoProvider = ProtoProvider {
        entry_name: "ansys.api.platform.instancemanagement",
        target: "ansys.api.platform.instancemanagement",
        package: "ansys-api-platform-instancemanagement",
        version: "1.1.2",
        proto_root: "/opt/protos/instancemanagement",
    };

    const LICENSING: ProtoProvider = ProtoProvider {
        entry_name: "ansys.api.platform.licensing",
        target: "ansys.api.platform.licensing",
        package: "ansys-api-platform-licensing",
        version: "0.4.0",
        proto_root: "/opt/protos/licensing",
    };

    #[test]
    fn providers_are_sorted_by_namespace() {
        let registry = ProviderRegistry::from_providers(&[LICENSING, INSTANCE_MANAGEMENT]).unwrap();

        let names: Vec<String> = registry.iter().map(|p| p.namespace.dotted()).collect();
        assert_eq!(
            names,
            vec![
                "ansys.api.platform.instancemanagement",
                "ansys.api.platform.licensing"
            ]
        );
        assert_eq!(
            registry.include_paths(),
            vec![
                Path::new("/opt/protos/instancemanagement"),
                Path::new("/opt/protos/licensing")
            ]
        );
    }

    #[test]
    fn lookup_by_dotted_namespace() {
        let registry = ProviderRegistry::from_providers(&[INSTANCE_MANAGEMENT]).unwrap();

        let provider = registry.get("ansys.api.platform.instancemanagement").unwrap();
        assert_eq!(provider.version.as_str(), "1.1.2");
        assert_eq!(
            provider.namespace_dir(),
            Path::new("/opt/protos/instancemanagement/ansys/api/platform/instancemanagement")
        );
        assert!(registry.get("ansys.api.platform").is_none());
        assert!(registry.get("not a namespace").is_none());
    }

    #[test]
    fn rejects_foreign_target() {
        let raw = ProtoProvider {
            target: "ansys.api.platform.licensing",
            ..INSTANCE_MANAGEMENT
        };
        let err = ProviderRegistry::from_providers(&[raw]).unwrap_err();
        assert!(matches!(err, RegistryError::NotSelfRegistered { .. }));
    }

    #[test]
    fn rejects_duplicates() {
        let err =
            ProviderRegistry::from_providers(&[INSTANCE_MANAGEMENT, INSTANCE_MANAGEMENT]).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
    }

    #[test]
    fn rejects_invalid_version() {
        let raw = ProtoProvider {
            version: "",
            ..INSTANCE_MANAGEMENT
        };
        let err = ProviderRegistry::from_providers(&[raw]).unwrap_err();
        assert!(matches!(err, RegistryError::Invalid { .. }));
    }

    #[test]
    fn manifest_lists_self_registrations() {
        let registry = ProviderRegistry::from_providers(&[INSTANCE_MANAGEMENT]).unwrap();
        let manifest = registry.manifest();

        assert_eq!(manifest.group, PROTO_PROVIDER_GROUP);
        assert_eq!(manifest.providers.len(), 1);
        assert_eq!(manifest.providers[0].entry, manifest.providers[0].target);
    }
}
