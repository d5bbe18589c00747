//! Stats command implementation.
//!
//! Shows item counts by review tier plus the scheduling settings in effect.

use super::Workspace;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{Statistics, format_status_badge};
use tracing::info;

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or counting fails.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let config = ws.scheduler_config()?;

    info!("Computing vocabulary statistics");
    let counts = ws.storage.count_by_status()?;
    let total = ws.storage.count_total()?;
    let mut stats = Statistics::from_counts(
        total,
        &counts,
        config.items_per_review,
        config.archive_days_threshold,
    );
    stats.last_import = ws.storage.get_metadata("last_import")?;

    if json {
        return super::print_json(&stats);
    }
    print_text_output(&stats);
    Ok(())
}

fn print_text_output(stats: &Statistics) {
    println!("Vocabulary statistics:\n");
    println!("  Total items:    {}", stats.total);
    println!("  Active:         {}", stats.active);
    for entry in &stats.by_status {
        println!(
            "    {} {:<10} {}",
            format_status_badge(entry.status),
            entry.status.as_str(),
            entry.count
        );
    }
    println!("  Archived:       {}", stats.archived);
    println!();
    println!(
        "  {} items per review, archive after {} idle days",
        stats.items_per_review, stats.archive_days_threshold
    );
    if let Some(last) = &stats.last_import {
        println!("  Last import: {last}");
    }
}
