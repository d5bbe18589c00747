//! List command implementation.

use super::Workspace;
use crate::cli::ListArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{format_item_line, plural};
use crate::model::{ItemKind, Status};
use crate::storage::ListFilters;
use std::str::FromStr;
use tracing::debug;

const LINE_CONTENT_WIDTH: usize = 60;

/// Execute the list command.
///
/// # Errors
///
/// Returns a validation error for an unknown status or kind, or a store error.
pub fn execute(args: &ListArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let filters = ListFilters {
        statuses: parse_all::<Status>(&args.status)?,
        kinds: parse_all::<ItemKind>(&args.kind)?,
        include_archived: args.all,
        archived_only: args.archived,
        content_contains: args.search.clone(),
        limit: args.limit,
    };
    debug!(filters = ?filters, "Applied list filters");

    let ws = Workspace::open(cli)?;
    let items = ws.storage.list_items(&filters)?;

    if json {
        return super::print_json(&items);
    }

    if items.is_empty() {
        println!("No items found.");
        return Ok(());
    }
    for item in &items {
        println!("{}", format_item_line(item, LINE_CONTENT_WIDTH));
    }
    println!("\n{} item{}", items.len(), plural(items.len()));
    Ok(())
}

/// Parse every value, or `None` when no filter was given.
fn parse_all<T>(values: &[String]) -> Result<Option<Vec<T>>>
where
    T: FromStr<Err = crate::error::VocabError>,
{
    if values.is_empty() {
        return Ok(None);
    }
    let parsed = values
        .iter()
        .map(|v| v.parse::<T>())
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(parsed))
}
