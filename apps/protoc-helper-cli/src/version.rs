use std::path::PathBuf;

use clap::Args;
use protoc_helper::{VERSION_FILE_NAME, read_version_file};

#[derive(Args)]
pub struct VersionArgs {
    /// VERSION file, or a directory containing one
    path: PathBuf,
}

impl VersionArgs {
    pub fn run(&self) -> anyhow::Result<()> {
        let path = if self.path.is_dir() {
            self.path.join(VERSION_FILE_NAME)
        } else {
            self.path.clone()
        };
        println!("{}", read_version_file(&path)?);
        Ok(())
    }
}
