//! History command implementation.

use super::Workspace;
use crate::cli::ShowArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_event_line;
use tracing::debug;

/// Execute the history command.
///
/// # Errors
///
/// Returns `NotFound` for an unknown id, or a store error.
pub fn execute(args: &ShowArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let item = ws.storage.require_item(args.id)?;
    let events = ws.storage.get_events(item.id)?;
    debug!(id = item.id, events = events.len(), "Loaded history");

    if json {
        return super::print_json(&events);
    }

    println!("History of #{} {}:", item.id, item.content);
    if events.is_empty() {
        println!("  (no events)");
    }
    for event in &events {
        println!("  {}", format_event_line(event));
    }
    Ok(())
}
