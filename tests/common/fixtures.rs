use chrono::NaiveDate;
use vocab_review::model::{ItemKind, NewItem};
use vocab_review::storage::{ItemProgress, SqliteStorage};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Builds items with optional prior progress for scheduling tests.
pub struct ItemBuilder {
    fields: NewItem,
    progress: ItemProgress,
}

impl ItemBuilder {
    pub fn new(content: &str) -> Self {
        Self {
            fields: NewItem::new(content),
            progress: ItemProgress::default(),
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.fields.kind = Some(kind);
        self
    }

    pub fn definition(mut self, definition: &str) -> Self {
        self.fields.definition = definition.to_string();
        self
    }

    pub fn added(mut self, added: NaiveDate) -> Self {
        self.fields.added_date = Some(added);
        self
    }

    pub fn reviews(mut self, count: u32) -> Self {
        self.progress.review_count = count;
        self
    }

    pub fn last_reviewed(mut self, last: NaiveDate) -> Self {
        self.progress.last_reviewed = Some(last);
        self
    }

    pub fn archived(mut self, archived: NaiveDate) -> Self {
        self.progress.archived_date = Some(archived);
        self
    }

    pub fn fields(&self) -> &NewItem {
        &self.fields
    }

    /// Insert into `storage`, keeping progress, and return the new id.
    pub fn insert(self, storage: &mut SqliteStorage) -> i64 {
        storage
            .restore_item(&self.fields, &self.progress)
            .expect("insert fixture item")
    }
}

/// Insert `n` items named `{prefix}{i}` with the given review count.
pub fn insert_many(storage: &mut SqliteStorage, prefix: &str, n: usize, reviews: u32) -> Vec<i64> {
    (0..n)
        .map(|i| {
            ItemBuilder::new(&format!("{prefix}{i}"))
                .reviews(reviews)
                .insert(storage)
        })
        .collect()
}
