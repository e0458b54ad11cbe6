//! Subcommands

pub mod process;
pub mod query;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use vantage_store::config::{StoreConfig, VantageConfig};

/// Snapshot store selection shared by all subcommands
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Configuration file (defaults to ./vantage.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Snapshot directory, overriding the configured store
    #[arg(long, conflicts_with = "in_memory")]
    pub store_dir: Option<PathBuf>,

    /// Keep snapshots in memory only
    #[arg(long)]
    pub in_memory: bool,
}

impl StoreArgs {
    /// Load the configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<VantageConfig> {
        let mut config = VantageConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.store_dir {
            config.store = StoreConfig::File { dir: dir.clone() };
        } else if self.in_memory {
            config.store = StoreConfig::InMemory;
        }
        config.validate()?;
        Ok(config)
    }
}
