//! Host tool for Ansys gRPC API packages.
//!
//! # Usage
//!
//! ```bash
//! # Validate and list every proto provider linked into this tool
//! protoc-helper providers
//!
//! # Include paths for a protoc invocation
//! protoc-helper include-paths
//!
//! # Descriptor of a package source tree
//! protoc-helper describe --root libs/api-platform-instancemanagement \
//!     --product platform --library instancemanagement --json
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// CLI tools are expected to print to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod describe;
mod providers;
mod registered_providers;
mod version;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protoc-helper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, validate and list the registered proto providers
    Providers(providers::ProvidersArgs),
    /// Print the proto include directory of every provider
    IncludePaths(providers::IncludePathsArgs),
    /// Compose and print the descriptor of a package source tree
    Describe(describe::DescribeArgs),
    /// Resolve a VERSION file
    Version(version::VersionArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Providers(args) => args.run(),
        Commands::IncludePaths(args) => args.run(),
        Commands::Describe(args) => args.run(),
        Commands::Version(args) => args.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
