#![allow(clippy::unwrap_used, clippy::expect_used)]

use ansys_api_platform_instancemanagement as package;
use anyhow::Context;
use protoc_helper::{PROTO_PROVIDER_GROUP, ProviderRegistry};

#[test]
fn exposes_trimmed_version() {
    assert!(!package::VERSION.is_empty());
    assert_eq!(package::VERSION, package::VERSION.trim());
    assert_eq!(package::version().unwrap().as_str(), package::VERSION);
}

#[test]
fn runtime_and_build_read_the_same_version() -> anyhow::Result<()> {
    let installed = package::read_installed_version().context("VERSION file is shipped")?;
    assert_eq!(installed.as_str(), package::VERSION);

    let descriptor = package::descriptor()?;
    assert_eq!(descriptor.version.as_str(), package::VERSION);
    Ok(())
}

#[test]
fn cargo_metadata_matches_version_file() {
    assert_eq!(env!("CARGO_PKG_VERSION"), package::VERSION);
}

#[test]
fn descriptor_describes_this_package() -> anyhow::Result<()> {
    let descriptor = package::descriptor()?;

    assert_eq!(descriptor.name, "ansys-api-platform-instancemanagement");
    assert_eq!(
        descriptor.namespace.dotted(),
        "ansys.api.platform.instancemanagement"
    );
    assert_eq!(package::NAMESPACE, "ansys.api.platform.instancemanagement");
    assert_eq!(descriptor.description, package::DESCRIPTION);
    assert!(package::DESCRIPTION.contains(package::PACKAGE_NAME));
    assert_eq!(
        descriptor.proto_provider(),
        Some((package::NAMESPACE, package::NAMESPACE))
    );
    assert!(descriptor.entry_points.contains_key(PROTO_PROVIDER_GROUP));
    Ok(())
}

#[test]
fn ships_proto_sources() -> anyhow::Result<()> {
    let descriptor = package::descriptor()?;
    let protos: Vec<_> = descriptor.proto_files().collect();

    assert_eq!(protos.len(), 1);
    for proto in protos {
        assert!(package::proto_root().join(proto).is_file());
    }
    Ok(())
}

#[test]
fn registers_itself_as_proto_provider() -> anyhow::Result<()> {
    let registry = ProviderRegistry::load()?;
    let provider = registry
        .get(package::NAMESPACE)
        .context("package registered itself")?;

    assert_eq!(provider.package, package::PACKAGE_NAME);
    assert_eq!(provider.version.as_str(), package::VERSION);
    assert_eq!(provider.proto_root, package::proto_root());
    assert!(provider.namespace_dir().join("VERSION").is_file());
    Ok(())
}

#[cfg(feature = "grpc")]
#[test]
fn exports_generated_service_stubs() {
    use package::v1;

    fn client_type<T>(_: Option<&package::ProductInstanceManagerClient<T>>) {}
    client_type::<tonic::transport::Channel>(None);

    let request = v1::GetInstanceRequest {
        name: "instances/mapdl-221-a1b2c3".to_owned(),
    };
    assert_eq!(request.name, "instances/mapdl-221-a1b2c3");
    assert_eq!(
        <package::ProductInstanceManagerServer<NoopManager> as tonic::server::NamedService>::NAME,
        package::SERVICE_NAME
    );
}

#[cfg(feature = "grpc")]
struct NoopManager;

#[cfg(feature = "grpc")]
#[tonic::async_trait]
impl package::ProductInstanceManager for NoopManager {
    async fn list_definitions(
        &self,
        _: tonic::Request<package::v1::ListDefinitionsRequest>,
    ) -> Result<tonic::Response<package::v1::ListDefinitionsResponse>, tonic::Status> {
        Err(tonic::Status::unimplemented("list_definitions"))
    }

    async fn list_instances(
        &self,
        _: tonic::Request<package::v1::ListInstancesRequest>,
    ) -> Result<tonic::Response<package::v1::ListInstancesResponse>, tonic::Status> {
        Err(tonic::Status::unimplemented("list_instances"))
    }

    async fn create_instance(
        &self,
        _: tonic::Request<package::v1::CreateInstanceRequest>,
    ) -> Result<tonic::Response<package::v1::Instance>, tonic::Status> {
        Err(tonic::Status::unimplemented("create_instance"))
    }

    async fn get_instance(
        &self,
        _: tonic::Request<package::v1::GetInstanceRequest>,
    ) -> Result<tonic::Response<package::v1::Instance>, tonic::Status> {
        Err(tonic::Status::unimplemented("get_instance"))
    }

    async fn delete_instance(
        &self,
        _: tonic::Request<package::v1::DeleteInstanceRequest>,
    ) -> Result<tonic::Response<package::v1::DeleteInstanceResponse>, tonic::Status> {
        Err(tonic::Status::unimplemented("delete_instance"))
    }
}
