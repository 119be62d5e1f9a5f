use clap::Args;
use colored::Colorize;
use protoc_helper::ProviderRegistry;

#[derive(Args)]
pub struct ProvidersArgs {
    /// Output the provider manifest as JSON
    #[arg(long)]
    json: bool,
}

impl ProvidersArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let registry = ProviderRegistry::load()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&registry.manifest())?);
            return Ok(());
        }

        if registry.is_empty() {
            println!("No proto providers registered");
            return Ok(());
        }

        let manifest = registry.manifest();
        println!("{}", manifest.group.bold());
        for entry in &manifest.providers {
            println!(
                "  {} = {}  {} {}",
                entry.entry.green(),
                entry.target,
                entry.package.dimmed(),
                entry.version.dimmed()
            );
            println!("    {}", entry.proto_root.display());
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct IncludePathsArgs {
    /// Print as `-I<path>` protoc arguments
    #[arg(long)]
    protoc_args: bool,
}

impl IncludePathsArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let registry = ProviderRegistry::load()?;
        for path in registry.include_paths() {
            if self.protoc_args {
                println!("-I{}", path.display());
            } else {
                println!("{}", path.display());
            }
        }
        Ok(())
    }
}
