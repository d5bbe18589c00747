//! Init command implementation.

use crate::cli::InitArgs;
use crate::config::{self, CliOverrides, DEFAULT_DB_FILENAME, VOCAB_DIR_NAME};
use crate::error::{Result, VocabError};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_TEMPLATE: &str = "\
# vocab configuration (project layer)
# items-per-review: 20
# archive-days-threshold: 30
";

#[derive(Serialize)]
struct InitOutput {
    vocab_dir: PathBuf,
    db_path: PathBuf,
    reinitialized: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if a database exists and `--force` is not
/// given, or an I/O or store error.
pub fn execute(args: &InitArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let vocab_dir = Path::new(".").join(VOCAB_DIR_NAME);
    let paths = config::ConfigPaths::resolve(&vocab_dir, cli.db.as_ref());
    let exists = paths.db_path.exists();

    if exists && !args.force {
        return Err(VocabError::AlreadyInitialized {
            path: paths.db_path.display().to_string(),
        });
    }

    fs::create_dir_all(&vocab_dir)?;
    if let Some(parent) = paths.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let config_path = vocab_dir.join("config.yaml");
    if !config_path.exists() {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    // Opening applies the schema; it is idempotent on an existing file.
    SqliteStorage::open(&paths.db_path)?;
    info!(path = %paths.db_path.display(), reinitialized = exists, "Initialized workspace");

    let output = InitOutput {
        vocab_dir,
        db_path: paths.db_path,
        reinitialized: exists,
    };
    if json {
        super::print_json(&output)?;
    } else if output.reinitialized {
        println!("Re-initialized {}", output.db_path.display());
    } else {
        println!(
            "Initialized vocabulary workspace in {} ({DEFAULT_DB_FILENAME} ready)",
            output.vocab_dir.display()
        );
    }
    Ok(())
}
