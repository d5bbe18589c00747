//! Due command implementation.
//!
//! Shows the batch the scheduler selects for today. Selection alone never
//! records a review; `--mark-reviewed` records the whole batch afterwards.

use super::Workspace;
use crate::cli::DueArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ReviewBatch, format_item_card, format_item_line, plural};
use crate::util;
use tracing::{info, trace};

const LINE_CONTENT_WIDTH: usize = 60;

/// Execute the due command.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the store fails.
pub fn execute(args: &DueArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let mut scheduler = ws.into_scheduler()?;
    let today = util::today();

    let items = scheduler.select_for_review(args.limit)?;
    let summary = scheduler.summary()?;
    info!(count = items.len(), active = summary.active, "Selected due items");
    for item in items.iter().take(5) {
        trace!(id = item.id, status = %item.status, reviews = item.review_count, "Due item");
    }

    let marked_reviewed = if args.mark_reviewed && !items.is_empty() {
        let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        Some(scheduler.record_reviews_on(&ids, today)?)
    } else {
        None
    };

    let batch = ReviewBatch {
        date: today,
        total_active: summary.active,
        items,
        marked_reviewed,
    };

    if json {
        return super::print_json(&batch);
    }

    if batch.items.is_empty() {
        println!("Nothing to review.");
        return Ok(());
    }

    println!(
        "Review for {} ({} item{}, {} active):\n",
        util::format_date(batch.date),
        batch.items.len(),
        plural(batch.items.len()),
        batch.total_active
    );
    for item in &batch.items {
        if args.brief {
            println!("{}", format_item_line(item, LINE_CONTENT_WIDTH));
        } else {
            println!("{}\n", format_item_card(item));
        }
    }
    if let Some(n) = batch.marked_reviewed {
        println!("Recorded {n} review{}.", plural(n));
    }
    Ok(())
}
