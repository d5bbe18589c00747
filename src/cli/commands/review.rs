//! Review command implementation.

use super::Workspace;
use crate::cli::ReviewArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ReviewOutcome, plural};
use crate::util;
use tracing::{info, warn};

/// Execute the review command.
///
/// Unknown ids are skipped; the output reports how many items changed.
///
/// # Errors
///
/// Returns a validation error for a malformed `--date`, or a store error.
pub fn execute(args: &ReviewArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let date = match args.date.as_deref() {
        Some(raw) => util::parse_date("date", raw)?,
        None => util::today(),
    };

    let ws = Workspace::open(cli)?;
    let mut scheduler = ws.into_scheduler()?;
    let updated = scheduler.record_reviews_on(&args.ids, date)?;

    if updated == 0 {
        warn!(ids = ?args.ids, "No known items among the reported ids");
    }
    info!(requested = args.ids.len(), updated, "Recorded reviews");

    let outcome = ReviewOutcome {
        requested: args.ids.len(),
        updated,
        date,
    };
    if json {
        super::print_json(&outcome)?;
    } else {
        println!(
            "Recorded {} review{} for {}",
            outcome.updated,
            plural(outcome.updated),
            util::format_date(outcome.date)
        );
    }
    Ok(())
}
