//! Output formatting for `vocab_review`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! With `--json`, stdout carries exactly one JSON document and diagnostics
//! go to stderr.
//!
//! # JSON Output Types
//!
//! - [`ReviewBatch`] - The due batch (due)
//! - [`ItemDetails`] - Item with its history (show)
//! - [`Statistics`] - Aggregate counts (stats)
//! - [`ReviewOutcome`] / [`ArchiveOutcome`] - Mutation results (review, archive)

mod output;
mod text;

pub use output::{
    ArchiveOutcome, ItemDetails, ReviewBatch, ReviewOutcome, Statistics, StatusCount,
};
pub use text::{
    format_event_line, format_item_card, format_item_line, format_status_badge, plural,
    truncate_content,
};
