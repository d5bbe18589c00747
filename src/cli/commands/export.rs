//! Export command implementation.

use super::Workspace;
use crate::cli::ExportArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::plural;
use crate::sync::export_to_jsonl;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExportOutput<'a> {
    exported: usize,
    path: &'a Path,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the items cannot be read or the file cannot be written.
pub fn execute(args: &ExportArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let exported = export_to_jsonl(&ws.storage, &args.path)?;

    if json {
        super::print_json(&ExportOutput {
            exported,
            path: &args.path,
        })?;
    } else {
        println!(
            "Exported {exported} item{} to {}",
            plural(exported),
            args.path.display()
        );
    }
    Ok(())
}
