//! Subcommand implementations.
//!
//! Each module exposes an `execute` function taking its parsed args, the
//! global `--json` flag, and the CLI config overrides.

pub mod add;
pub mod archive;
pub mod config;
pub mod due;
pub mod export;
pub mod history;
pub mod import;
pub mod init;
pub mod list;
pub mod review;
pub mod show;
pub mod stats;

use crate::config::{self as cfg, CliOverrides, ConfigLayer, ConfigPaths};
use crate::error::{Result, VocabError};
use crate::scheduler::{ReviewScheduler, SchedulerConfig};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An opened workspace: storage plus the merged configuration.
pub struct Workspace {
    pub storage: SqliteStorage,
    pub paths: ConfigPaths,
    pub layer: ConfigLayer,
}

impl Workspace {
    /// Discover the workspace from the CWD and open its database.
    ///
    /// With `--db` and no `.vocab` directory, the database's parent directory
    /// stands in for the workspace.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if no workspace is found, or a config/store error.
    pub fn open(cli: &CliOverrides) -> Result<Self> {
        let vocab_dir = match (cfg::discover_vocab_dir(Some(Path::new("."))), &cli.db) {
            (Ok(dir), _) => dir,
            (Err(VocabError::NotInitialized), Some(db)) => db_parent(db),
            (Err(e), _) => return Err(e),
        };

        let startup = cfg::load_config(&vocab_dir, None, cli)?;
        let lock_timeout = cfg::lock_timeout_from_layer(&startup)?;
        let (storage, paths) = cfg::open_storage(&vocab_dir, cli.db.as_ref(), lock_timeout)?;
        let layer = cfg::load_config(&vocab_dir, Some(&storage), cli)?;
        debug!(db = %paths.db_path.display(), "Opened workspace");

        Ok(Self {
            storage,
            paths,
            layer,
        })
    }

    /// # Errors
    ///
    /// Returns a config error if a numeric setting is malformed.
    pub fn scheduler_config(&self) -> Result<SchedulerConfig> {
        cfg::scheduler_config_from_layer(&self.layer)
    }

    /// Hand the storage to a scheduler built from the merged config.
    ///
    /// # Errors
    ///
    /// Returns a config error if a numeric setting is malformed.
    pub fn into_scheduler(self) -> Result<ReviewScheduler<SqliteStorage>> {
        let config = self.scheduler_config()?;
        Ok(ReviewScheduler::new(self.storage, config))
    }
}

fn db_parent(db: &Path) -> PathBuf {
    db.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
