//! Show command implementation.

use super::Workspace;
use crate::cli::ShowArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ItemDetails, format_event_line, format_item_card};

/// Execute the show command.
///
/// # Errors
///
/// Returns `NotFound` for an unknown id, or a store error.
pub fn execute(args: &ShowArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let item = ws.storage.require_item(args.id)?;
    let events = ws.storage.get_events(args.id)?;
    let details = ItemDetails { item, events };

    if json {
        return super::print_json(&details);
    }

    println!("{}", format_item_card(&details.item));
    if !details.events.is_empty() {
        println!("\nHistory:");
        for event in &details.events {
            println!("  {}", format_event_line(event));
        }
    }
    Ok(())
}
