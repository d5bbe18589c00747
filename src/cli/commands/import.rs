//! Import command implementation.

use super::Workspace;
use crate::cli::ImportArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::plural;
use crate::sync::{ImportConfig, import_from_json};

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the import
/// transaction fails (nothing is imported then).
pub fn execute(args: &ImportArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let mut ws = Workspace::open(cli)?;
    let config = ImportConfig {
        preserve_progress: args.preserve_progress,
    };
    let result = import_from_json(&mut ws.storage, &args.path, &config)?;

    if json {
        return super::print_json(&result);
    }
    println!(
        "Imported {} item{} from {}",
        result.imported,
        plural(result.imported),
        args.path.display()
    );
    if result.skipped_duplicates > 0 {
        println!("  Skipped {} duplicate{}", result.skipped_duplicates, plural(result.skipped_duplicates));
    }
    if result.skipped_invalid > 0 {
        println!("  Skipped {} invalid record{}", result.skipped_invalid, plural(result.skipped_invalid));
    }
    Ok(())
}
