//! Archive command implementation.

use super::Workspace;
use crate::cli::ArchiveArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ArchiveOutcome, plural};
use crate::util;

/// Execute the archive command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the sweep fails.
pub fn execute(args: &ArchiveArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let mut scheduler = ws.into_scheduler()?;
    let days = args
        .days
        .unwrap_or(scheduler.config().archive_days_threshold);
    let today = util::today();

    let archived = scheduler.archive_sweep_on(Some(days), today)?;

    let outcome = ArchiveOutcome {
        archived,
        days_threshold: days,
        date: today,
    };
    if json {
        super::print_json(&outcome)?;
    } else {
        println!(
            "Archived {} mastered item{} not reviewed in over {} day{}",
            archived,
            plural(archived),
            days,
            plural(days as usize)
        );
    }
    Ok(())
}
