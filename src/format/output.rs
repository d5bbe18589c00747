//! JSON output shapes shared by the CLI commands.

use crate::model::{Event, Status, VocabItem};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// The batch handed to the learner for one session.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewBatch {
    pub date: NaiveDate,
    pub total_active: usize,
    pub items: Vec<VocabItem>,
    /// Set when `--mark-reviewed` recorded the batch immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_reviewed: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: VocabItem,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Aggregate counts for `vocab stats`.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub active: usize,
    pub archived: usize,
    pub by_status: Vec<StatusCount>,
    pub items_per_review: usize,
    pub archive_days_threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_import: Option<String>,
}

impl Statistics {
    /// Build from per-status active counts, listing every tier even when empty.
    #[must_use]
    pub fn from_counts(
        total: usize,
        counts: &HashMap<Status, usize>,
        items_per_review: usize,
        archive_days_threshold: u32,
    ) -> Self {
        let by_status: Vec<StatusCount> = Status::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: counts.get(&status).copied().unwrap_or(0),
            })
            .collect();
        let active = by_status.iter().map(|c| c.count).sum();

        Self {
            total,
            active,
            archived: total.saturating_sub(active),
            by_status,
            items_per_review,
            archive_days_threshold,
            last_import: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub requested: usize,
    pub updated: usize,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveOutcome {
    pub archived: usize,
    pub days_threshold: u32,
    pub date: NaiveDate,
}
