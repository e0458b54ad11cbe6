//! Vantage configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! config file, then `VANTAGE_*` environment variables
//! (e.g. `VANTAGE_STORE__TYPE=InMemory`, `VANTAGE_STORE__DIR=/tmp/snaps`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::{FileStore, MemoryStore, SnapshotStore};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "vantage.toml";

/// Snapshot directory used when none is configured
pub const DEFAULT_STORE_DIR: &str = ".vantage/snapshots";

fn default_store_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_DIR)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VantageConfig {
    /// Snapshot storage backend
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreConfig {
    File {
        #[serde(default = "default_store_dir")]
        dir: PathBuf,
    },
    InMemory,
}

impl Default for VantageConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::File {
                dir: default_store_dir(),
            },
        }
    }
}

impl VantageConfig {
    /// Load configuration from `path` (required) or, when `None`, from
    /// [`DEFAULT_CONFIG_FILE`] if it exists. Environment variables win.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = ::config::Config::builder().set_default("store.type", "File")?;

        let builder = match path {
            Some(p) => builder.add_source(::config::File::from(p)),
            None => builder.add_source(::config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let config: VantageConfig = builder
            .add_source(
                ::config::Environment::with_prefix("VANTAGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let StoreConfig::File { dir } = &self.store {
            if dir.as_os_str().is_empty() {
                anyhow::bail!("Snapshot store directory must not be empty");
            }
        }
        Ok(())
    }
}

impl StoreConfig {
    /// Open the configured store
    pub fn open(&self) -> Result<Box<dyn SnapshotStore>> {
        match self {
            StoreConfig::File { dir } => {
                let store = FileStore::open(dir)
                    .with_context(|| format!("Failed to open snapshot store {}", dir.display()))?;
                Ok(Box::new(store))
            }
            StoreConfig::InMemory => Ok(Box::new(MemoryStore::new())),
        }
    }
}
