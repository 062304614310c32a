//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{bail, Result};

use maskfill_store::config::load_config_from;
use maskfill_store::{MaskfillConfig, StoreConfig};

pub mod init;
pub mod run;
pub mod sentences;

/// Where a command gets its config and store from.
pub struct StoreSource {
    pub config: Option<PathBuf>,
    pub fixture: Option<PathBuf>,
    pub record_to: Option<PathBuf>,
}

impl StoreSource {
    /// Load the config file and pick the store, letting `--fixture` win.
    pub fn load(self) -> Result<(MaskfillConfig, StoreConfig)> {
        let config = load_config_from(self.config.as_deref())?;
        let store = match (self.fixture, &config.store) {
            (Some(path), _) => StoreConfig::Fixture {
                path,
                record_to: self.record_to,
            },
            (None, Some(StoreConfig::Fixture { path, record_to })) => StoreConfig::Fixture {
                path: path.clone(),
                record_to: self.record_to.or_else(|| record_to.clone()),
            },
            (None, Some(_)) if self.record_to.is_some() => {
                bail!("--record-to only applies to fixture stores")
            }
            (None, Some(store)) => store.clone(),
            (None, None) => {
                bail!("no store configured. Run `maskfill init` or pass --fixture <path>")
            }
        };
        Ok((config, store))
    }
}
