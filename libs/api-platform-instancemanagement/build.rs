use protoc_helper::{CommandOverrides, PackageConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = PackageConfig::for_library("platform", "instancemanagement");

    let overrides = CommandOverrides::new();
    #[cfg(feature = "grpc")]
    let overrides = overrides.with(
        protoc_helper::commands::COMPILE_PROTOS,
        protoc_helper::TonicCompileProtos::default(),
    );

    protoc_helper::build_script::emit(&config, &overrides)
}
