use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use protoc_helper::{BuildTimestamp, DistributionBuilder, PackageConfig, PackageDescriptor};

#[derive(Args)]
pub struct DescribeArgs {
    /// Package root (directory holding README.md and proto/)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long, default_value = "platform")]
    product: String,

    #[arg(long, default_value = "instancemanagement")]
    library: String,

    /// YAML file layered over the defaults (env PROTOC_HELPER_* wins over it)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output the descriptor as JSON
    #[arg(long)]
    json: bool,
}

impl DescribeArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let descriptor = self.build()?;
        if self.json {
            println!("{}", descriptor.to_manifest_json()?);
        } else {
            print_descriptor(&descriptor);
        }
        Ok(())
    }

    fn build(&self) -> anyhow::Result<PackageDescriptor> {
        let base = PackageConfig::for_library(&self.product, &self.library);
        let config = PackageConfig::load(&base, self.config.as_deref())
            .context("failed to load package configuration")?;

        tracing::info!(root = %self.root.display(), "Describing package");
        DistributionBuilder::new(&self.root, config)
            .build(BuildTimestamp::from_env_or_now())
            .with_context(|| format!("failed to describe package at {}", self.root.display()))
    }
}

fn print_descriptor(d: &PackageDescriptor) {
    println!("{} {}", d.name.bold(), d.version.to_string().green());
    println!("  {}", d.description);
    println!("  namespace:     {}", d.namespace);
    println!("  proto package: {}", d.proto_package);
    println!("  author:        {} <{}>", d.author.name, d.author.email);
    println!("  license:       {}", d.license);
    println!("  url:           {}", d.url);
    println!("  rust:          {}", d.rust_version);

    println!("  dependencies:");
    for dep in &d.dependencies {
        println!("    {} {}", dep.name, dep.requirement);
    }
    println!("  packages:");
    for package in &d.packages {
        println!("    {package}");
    }
    println!("  data files ({}):", d.data_patterns.join(", "));
    for file in &d.data_files {
        println!("    {}", file.display());
    }
    if let Some((entry, target)) = d.proto_provider() {
        println!("  {}:", protoc_helper::PROTO_PROVIDER_GROUP);
        println!("    {entry} = {target}");
    }
}
