//! `SQLite` storage layer for `vocab_review`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - WAL mode for concurrent reads
//! - Transaction discipline for atomic writes
//! - An audit event log of creations, reviews, and archivals
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main `SQLite` storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{ItemProgress, ListFilters, MutationContext, SqliteStorage};

use crate::error::Result;
use crate::model::{NewItem, VocabItem};
use chrono::NaiveDate;

/// The store boundary the scheduler works against.
///
/// Any backend with the same transactional guarantees can implement it;
/// [`SqliteStorage`] is the shipped one. Dates are passed explicitly so the
/// caller decides what "today" is.
pub trait ItemStore {
    /// Create tables and indexes if absent.
    ///
    /// # Errors
    ///
    /// Returns a store error if the schema cannot be applied.
    fn create_schema(&self) -> Result<()>;

    /// Insert a new learning-tier item and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty content, or a store error.
    fn add(&mut self, fields: &NewItem) -> Result<i64>;

    /// Active items in due order, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    fn query_due(&self, limit: usize) -> Result<Vec<VocabItem>>;

    /// Record one review per known id; unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns a store error if the batch cannot commit.
    fn apply_reviews_at(&mut self, ids: &[i64], today: NaiveDate) -> Result<usize>;

    /// Archive mastered items idle for longer than `days_threshold` days.
    ///
    /// # Errors
    ///
    /// Returns a store error if the sweep cannot commit.
    fn archive_mastered_at(&mut self, days_threshold: u32, today: NaiveDate) -> Result<usize>;

    /// # Errors
    ///
    /// Returns a store error if the query fails.
    fn count_active(&self) -> Result<usize>;

    /// # Errors
    ///
    /// Returns a store error if the query fails.
    fn count_total(&self) -> Result<usize>;
}

impl ItemStore for SqliteStorage {
    fn create_schema(&self) -> Result<()> {
        Self::create_schema(self)
    }

    fn add(&mut self, fields: &NewItem) -> Result<i64> {
        Self::add(self, fields)
    }

    fn query_due(&self, limit: usize) -> Result<Vec<VocabItem>> {
        Self::query_due(self, limit)
    }

    fn apply_reviews_at(&mut self, ids: &[i64], today: NaiveDate) -> Result<usize> {
        Self::apply_reviews_at(self, ids, today)
    }

    fn archive_mastered_at(&mut self, days_threshold: u32, today: NaiveDate) -> Result<usize> {
        Self::archive_mastered_at(self, days_threshold, today)
    }

    fn count_active(&self) -> Result<usize> {
        Self::count_active(self)
    }

    fn count_total(&self) -> Result<usize> {
        Self::count_total(self)
    }
}

impl<T: ItemStore + ?Sized> ItemStore for &mut T {
    fn create_schema(&self) -> Result<()> {
        (**self).create_schema()
    }

    fn add(&mut self, fields: &NewItem) -> Result<i64> {
        (**self).add(fields)
    }

    fn query_due(&self, limit: usize) -> Result<Vec<VocabItem>> {
        (**self).query_due(limit)
    }

    fn apply_reviews_at(&mut self, ids: &[i64], today: NaiveDate) -> Result<usize> {
        (**self).apply_reviews_at(ids, today)
    }

    fn archive_mastered_at(&mut self, days_threshold: u32, today: NaiveDate) -> Result<usize> {
        (**self).archive_mastered_at(days_threshold, today)
    }

    fn count_active(&self) -> Result<usize> {
        (**self).count_active()
    }

    fn count_total(&self) -> Result<usize> {
        (**self).count_total()
    }
}
