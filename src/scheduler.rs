//! Review scheduling policy.
//!
//! A deterministic tiered policy: pick the due batch from active items
//! (learning before reviewing before mastered, fewer reviews first, oldest
//! review first), record reviews the caller reports back, and periodically
//! sweep long-idle mastered items into the archive.
//!
//! Selecting a batch never records anything. The caller delivers the batch
//! and only then reports the ids that were actually reviewed.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::VocabItem;
use crate::storage::ItemStore;
use crate::util;

pub const DEFAULT_ITEMS_PER_REVIEW: usize = 20;
pub const DEFAULT_ARCHIVE_DAYS_THRESHOLD: u32 = 30;

/// Tunables consumed by the scheduler. Supplied at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerConfig {
    pub items_per_review: usize,
    pub archive_days_threshold: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            items_per_review: DEFAULT_ITEMS_PER_REVIEW,
            archive_days_threshold: DEFAULT_ARCHIVE_DAYS_THRESHOLD,
        }
    }
}

/// Active vs. total item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub active: usize,
    pub total: usize,
}

/// Selection and state-transition policy over an [`ItemStore`].
#[derive(Debug)]
pub struct ReviewScheduler<S> {
    store: S,
    config: SchedulerConfig,
}

impl<S: ItemStore> ReviewScheduler<S> {
    pub const fn new(store: S, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Pick the due batch.
    ///
    /// `max_items` of `None` uses the configured `items_per_review`. An empty
    /// store yields an empty batch, not an error.
    ///
    /// # Errors
    ///
    /// Returns a store error if the items cannot be read.
    pub fn select_for_review(&self, max_items: Option<usize>) -> Result<Vec<VocabItem>> {
        let limit = max_items.unwrap_or(self.config.items_per_review);
        let batch = self.store.query_due(limit)?;
        debug!(
            limit,
            selected = batch.len(),
            ids = ?batch.iter().map(|item| item.id).collect::<Vec<_>>(),
            "Selected review batch"
        );
        Ok(batch)
    }

    /// Record that the given items were reviewed today.
    ///
    /// # Errors
    ///
    /// Returns a store error if the batch cannot commit; nothing is applied then.
    pub fn record_reviews(&mut self, ids: &[i64]) -> Result<usize> {
        self.record_reviews_on(ids, util::today())
    }

    /// Record that the given items were reviewed on `date`.
    ///
    /// Ids the store does not know are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns a store error if the batch cannot commit; nothing is applied then.
    pub fn record_reviews_on(&mut self, ids: &[i64], date: NaiveDate) -> Result<usize> {
        let updated = self.store.apply_reviews_at(ids, date)?;
        if updated < ids.len() {
            debug!(
                reported = ids.len(),
                updated, "Some reported ids were unknown or repeated"
            );
        }
        Ok(updated)
    }

    /// Archive mastered items idle for `days` (default: configured threshold).
    ///
    /// # Errors
    ///
    /// Returns a store error if the sweep cannot commit.
    pub fn archive_sweep(&mut self, days: Option<u32>) -> Result<usize> {
        self.archive_sweep_on(days, util::today())
    }

    /// Archive sweep evaluated as of `today`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the sweep cannot commit.
    pub fn archive_sweep_on(&mut self, days: Option<u32>, today: NaiveDate) -> Result<usize> {
        let days = days.unwrap_or(self.config.archive_days_threshold);
        let archived = self.store.archive_mastered_at(days, today)?;
        info!(archived, days, "Archived idle mastered items");
        Ok(archived)
    }

    /// # Errors
    ///
    /// Returns a store error if the counts cannot be read.
    pub fn summary(&self) -> Result<ScheduleSummary> {
        Ok(ScheduleSummary {
            active: self.store.count_active()?,
            total: self.store.count_total()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewItem, Status};
    use crate::storage::{ItemProgress, SqliteStorage};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduler() -> ReviewScheduler<SqliteStorage> {
        ReviewScheduler::new(
            SqliteStorage::open_memory().unwrap(),
            SchedulerConfig::default(),
        )
    }

    #[test]
    fn empty_store_selects_nothing() {
        let sched = scheduler();
        assert!(sched.select_for_review(None).unwrap().is_empty());
        assert!(sched.select_for_review(Some(5)).unwrap().is_empty());
    }

    #[test]
    fn default_limit_comes_from_config() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        for i in 0..8 {
            storage.add(&NewItem::new(format!("word{i}"))).unwrap();
        }
        let config = SchedulerConfig {
            items_per_review: 3,
            ..SchedulerConfig::default()
        };
        let sched = ReviewScheduler::new(storage, config);
        assert_eq!(sched.select_for_review(None).unwrap().len(), 3);
        assert_eq!(sched.select_for_review(Some(5)).unwrap().len(), 5);
        assert_eq!(sched.select_for_review(Some(0)).unwrap().len(), 0);
    }

    #[test]
    fn selecting_does_not_record() {
        let mut sched = scheduler();
        let id = ItemStore::add(&mut sched.store, &NewItem::new("aloof")).unwrap();

        let batch = sched.select_for_review(None).unwrap();
        assert_eq!(batch.len(), 1);

        let item = sched.store().get_item(id).unwrap().unwrap();
        assert_eq!(item.review_count, 0);
        assert_eq!(item.last_reviewed, None);
    }

    #[test]
    fn recording_advances_tiers() {
        let mut sched = scheduler();
        let id = ItemStore::add(&mut sched.store, &NewItem::new("tenacious")).unwrap();

        let mut seen = Vec::new();
        for day in 1..=7 {
            sched.record_reviews_on(&[id], date(2025, 4, day)).unwrap();
            seen.push(sched.store().get_item(id).unwrap().unwrap().status);
        }

        assert_eq!(
            seen,
            vec![
                Status::Learning,
                Status::Learning,
                Status::Reviewing,
                Status::Reviewing,
                Status::Reviewing,
                Status::Reviewing,
                Status::Mastered,
            ]
        );
    }

    #[test]
    fn sweep_uses_configured_threshold() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage
            .restore_item(
                &NewItem::new("idle"),
                &ItemProgress {
                    review_count: 7,
                    last_reviewed: Some(date(2025, 5, 1)),
                    archived_date: None,
                },
            )
            .unwrap();
        let config = SchedulerConfig {
            archive_days_threshold: 10,
            ..SchedulerConfig::default()
        };
        let mut sched = ReviewScheduler::new(storage, config);

        assert_eq!(sched.archive_sweep_on(None, date(2025, 5, 11)).unwrap(), 0);
        assert_eq!(sched.archive_sweep_on(None, date(2025, 5, 12)).unwrap(), 1);
        assert_eq!(sched.summary().unwrap(), ScheduleSummary { active: 0, total: 1 });
    }

    #[test]
    fn works_over_borrowed_store() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.add(&NewItem::new("borrowed")).unwrap();
        {
            let sched = ReviewScheduler::new(&mut storage, SchedulerConfig::default());
            assert_eq!(sched.select_for_review(None).unwrap().len(), 1);
        }
        assert_eq!(storage.count_total().unwrap(), 1);
    }
}
