//! `SQLite` storage implementation.

use crate::error::{Result, VocabError};
use crate::model::{Event, EventType, ItemKind, NewItem, Status, VocabItem};
use crate::storage::schema::apply_schema;
use crate::util::{self, format_date, normalize_content};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info, trace};

/// Columns read for every item, in `item_from_row` order.
const ITEM_COLUMNS: &str = "id, kind, content, pronunciation, definition, translation, example,
     original_context, usage_note, synonyms, key_phrases, memory_trick, fun_fact,
     added_date, review_count, last_reviewed, status, archived_date";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, collecting the audit events it produces.
pub struct MutationContext {
    pub op_name: String,
    pub events: Vec<Event>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            events: Vec::new(),
        }
    }

    pub fn record_event(&mut self, event_type: EventType, item_id: i64, details: Option<String>) {
        self.record_field_change(event_type, item_id, None, None, details);
    }

    /// Record a field change event with old and new values.
    pub fn record_field_change(
        &mut self,
        event_type: EventType,
        item_id: i64,
        old_value: Option<String>,
        new_value: Option<String>,
        comment: Option<String>,
    ) {
        self.events.push(Event {
            id: 0, // DB assigns auto-inc ID
            item_id,
            event_type,
            old_value,
            new_value,
            comment,
            created_at: Utc::now(),
        });
    }
}

/// Review progress carried over when restoring an item from an export.
///
/// `status` is deliberately absent: it is always derived from `review_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemProgress {
    pub review_count: u32,
    pub last_reviewed: Option<NaiveDate>,
    pub archived_date: Option<NaiveDate>,
}

impl SqliteStorage {
    /// Open a connection to the database at the given path, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open with an optional busy timeout (milliseconds) for lock contention.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(ms) = lock_timeout_ms {
            conn.busy_timeout(std::time::Duration::from_millis(ms))?;
        }
        let storage = Self { conn };
        storage.create_schema()?;
        debug!(path = %path.display(), "Opened vocabulary database");
        Ok(storage)
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Create tables and indexes if absent. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL cannot be applied.
    pub fn create_schema(&self) -> Result<()> {
        apply_schema(&self.conn)?;
        Ok(())
    }

    /// Execute a mutation inside one IMMEDIATE transaction.
    ///
    /// The closure does the writes; events it records are persisted before commit.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. Nothing is committed in that case.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            tx.execute(
                "INSERT INTO events (item_id, event_type, old_value, new_value, comment, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    event.item_id,
                    event.event_type.as_str(),
                    event.old_value,
                    event.new_value,
                    event.comment,
                    event.created_at.to_rfc3339()
                ],
            )?;
        }

        tx.commit()?;
        trace!(op = %ctx.op_name, events = ctx.events.len(), "Committed mutation");
        Ok(result)
    }

    /// Add a new item in the learning tier with no reviews.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `content` is empty (nothing is written),
    /// or a database error if the insert fails.
    pub fn add(&mut self, fields: &NewItem) -> Result<i64> {
        fields.validate()?;
        let today = util::today();
        let id = self.mutate("add", |tx, ctx| {
            let id = insert_item(tx, fields, &ItemProgress::default(), today)?;
            ctx.record_event(
                EventType::Created,
                id,
                Some(format!("Added {}: {}", fields.resolved_kind(), fields.content)),
            );
            Ok(id)
        })?;
        info!(id, content = %fields.content, "Added vocabulary item");
        Ok(id)
    }

    /// Insert an item together with previously recorded progress.
    ///
    /// The stored status is recomputed from `progress.review_count`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty content, or a database error.
    pub fn restore_item(&mut self, fields: &NewItem, progress: &ItemProgress) -> Result<i64> {
        fields.validate()?;
        let today = util::today();
        self.mutate("restore_item", |tx, ctx| {
            let id = insert_item(tx, fields, progress, today)?;
            ctx.record_event(
                EventType::Imported,
                id,
                Some(format!("Restored with {} reviews", progress.review_count)),
            );
            Ok(id)
        })
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_item(&self, id: i64) -> Result<Option<VocabItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM vocab_items WHERE id = ?");
        let item = self
            .conn
            .query_row(&sql, [id], item_from_row)
            .optional()?;
        Ok(item)
    }

    /// Get an item that must exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no item has this id.
    pub fn require_item(&self, id: i64) -> Result<VocabItem> {
        self.get_item(id)?.ok_or(VocabError::NotFound { id })
    }

    /// Find an item whose content matches case-insensitively (ignoring padding).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_by_content(&self, content: &str) -> Result<Option<VocabItem>> {
        let wanted = normalize_content(content);
        let found = content_index(&self.conn)?.get(&wanted).copied();
        match found {
            Some(id) => self.get_item(id),
            None => Ok(None),
        }
    }

    /// Active items in due order, truncated to `limit`.
    ///
    /// Order: status tier, then review count, then last review date with
    /// never-reviewed first, then id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn query_due(&self, limit: usize) -> Result<Vec<VocabItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM vocab_items
             WHERE archived_date IS NULL
             ORDER BY
                CASE status
                    WHEN 'learning' THEN 0
                    WHEN 'reviewing' THEN 1
                    WHEN 'mastered' THEN 2
                    ELSE 3
                END,
                review_count ASC,
                last_reviewed IS NOT NULL,
                last_reviewed ASC,
                id ASC
             LIMIT ?"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([limit], item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(limit, returned = items.len(), "Queried due items");
        Ok(items)
    }

    /// Record one review for each id, dated today.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot commit.
    pub fn apply_reviews(&mut self, ids: &[i64]) -> Result<usize> {
        self.apply_reviews_at(ids, util::today())
    }

    /// Record one review for each id, dated `today`.
    ///
    /// Unknown ids are skipped without error and repeated ids count once.
    /// Returns how many items were updated. All updates commit together or
    /// not at all.
    ///
    /// # Errors
    ///
    /// Returns an error if any update fails or the transaction cannot commit.
    pub fn apply_reviews_at(&mut self, ids: &[i64], today: NaiveDate) -> Result<usize> {
        let today_str = format_date(today);
        let updated = self.mutate("apply_reviews", |tx, ctx| {
            let mut seen = HashSet::new();
            let mut updated = 0usize;

            for &id in ids {
                if !seen.insert(id) {
                    continue;
                }

                let current: Option<(u32, String)> = tx
                    .query_row(
                        "SELECT review_count, status FROM vocab_items WHERE id = ?",
                        [id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                let Some((count, old_status)) = current else {
                    debug!(id, "Ignoring review for unknown item");
                    continue;
                };

                let new_count = count.saturating_add(1);
                let status = Status::for_review_count(new_count);
                tx.execute(
                    "UPDATE vocab_items
                     SET review_count = ?, last_reviewed = ?, status = ?
                     WHERE id = ?",
                    rusqlite::params![new_count, today_str, status.as_str(), id],
                )?;

                ctx.record_field_change(
                    EventType::Reviewed,
                    id,
                    Some(format!("{count} ({old_status})")),
                    Some(format!("{new_count} ({status})")),
                    None,
                );
                updated += 1;
            }

            Ok(updated)
        })?;

        info!(
            requested = ids.len(),
            updated,
            date = %today_str,
            "Applied reviews"
        );
        Ok(updated)
    }

    /// Archive mastered items not reviewed in the last `days_threshold` days.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot commit.
    pub fn archive_mastered(&mut self, days_threshold: u32) -> Result<usize> {
        self.archive_mastered_at(days_threshold, util::today())
    }

    /// Archive mastered, active items whose `last_reviewed` is strictly before
    /// `today - days_threshold`. Items never reviewed are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot commit.
    pub fn archive_mastered_at(&mut self, days_threshold: u32, today: NaiveDate) -> Result<usize> {
        let cutoff = today
            .checked_sub_signed(Duration::days(i64::from(days_threshold)))
            .unwrap_or(NaiveDate::MIN);
        let cutoff_str = format_date(cutoff);
        let today_str = format_date(today);

        let archived = self.mutate("archive_mastered", |tx, ctx| {
            let ids: Vec<i64> = {
                let mut stmt = tx.prepare(
                    "SELECT id FROM vocab_items
                     WHERE status = 'mastered'
                       AND archived_date IS NULL
                       AND last_reviewed < ?
                     ORDER BY id",
                )?;
                stmt.query_map([&cutoff_str], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            for &id in &ids {
                tx.execute(
                    "UPDATE vocab_items SET archived_date = ? WHERE id = ?",
                    rusqlite::params![today_str, id],
                )?;
                ctx.record_event(
                    EventType::Archived,
                    id,
                    Some(format!("Idle since before {cutoff_str}")),
                );
            }

            Ok(ids.len())
        })?;

        info!(archived, days_threshold, cutoff = %cutoff_str, "Archive sweep finished");
        Ok(archived)
    }

    /// Count items that are not archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active(&self) -> Result<usize> {
        self.count("SELECT count(*) FROM vocab_items WHERE archived_date IS NULL")
    }

    /// Count all items, archived included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_total(&self) -> Result<usize> {
        self.count("SELECT count(*) FROM vocab_items")
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Active item counts per status tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_by_status(&self) -> Result<HashMap<Status, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, count(*) FROM vocab_items
             WHERE archived_date IS NULL
             GROUP BY status",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut counts: HashMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        for (status, count) in rows {
            let status: Status = status.parse()?;
            counts.insert(status, usize::try_from(count).unwrap_or(0));
        }
        Ok(counts)
    }

    /// List items with optional filters, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_items(&self, filters: &ListFilters) -> Result<Vec<VocabItem>> {
        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM vocab_items WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref statuses) = filters.statuses {
            if !statuses.is_empty() {
                let placeholders: Vec<&str> = statuses.iter().map(|_| "?").collect();
                let _ = write!(sql, " AND status IN ({})", placeholders.join(","));
                for s in statuses {
                    params.push(Box::new(s.as_str().to_string()));
                }
            }
        }

        if let Some(ref kinds) = filters.kinds {
            if !kinds.is_empty() {
                let placeholders: Vec<&str> = kinds.iter().map(|_| "?").collect();
                let _ = write!(sql, " AND kind IN ({})", placeholders.join(","));
                for k in kinds {
                    params.push(Box::new(k.as_str().to_string()));
                }
            }
        }

        if filters.archived_only {
            sql.push_str(" AND archived_date IS NOT NULL");
        } else if !filters.include_archived {
            sql.push_str(" AND archived_date IS NULL");
        }

        if let Some(ref needle) = filters.content_contains {
            sql.push_str(" AND content LIKE ?");
            params.push(Box::new(format!("%{needle}%")));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = filters.limit {
            if limit > 0 {
                let _ = write!(sql, " LIMIT {limit}");
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let items = stmt
            .query_map(params_refs.as_slice(), item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Audit history for one item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_events(&self, item_id: i64) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, event_type, old_value, new_value, comment, created_at
             FROM events WHERE item_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([item_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, item_id, event_type, old_value, new_value, comment, created_at)| {
                Ok(Event {
                    id,
                    item_id,
                    event_type: event_type.parse()?,
                    old_value,
                    new_value,
                    comment,
                    created_at: parse_datetime(&created_at),
                })
            })
            .collect()
    }

    /// Get a config value from the DB config table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM config WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Read a bookkeeping value such as `last_import`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Get all config values from the DB config table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_all_config(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM config")?;
        let map = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(map)
    }

    /// Set a config value in the DB config table.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.mutate("set_config", |tx, _ctx| {
            tx.execute(
                "INSERT OR REPLACE INTO config (key, value) VALUES (?, ?)",
                rusqlite::params![key, value],
            )?;
            Ok(())
        })
    }
}

/// Filter options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub statuses: Option<Vec<Status>>,
    pub kinds: Option<Vec<ItemKind>>,
    pub include_archived: bool,
    pub archived_only: bool,
    pub content_contains: Option<String>,
    pub limit: Option<usize>,
}

/// Insert one item row inside an open transaction and return its id.
///
/// # Errors
///
/// Returns an error if list fields cannot be encoded or the insert fails.
pub fn insert_item(
    tx: &Transaction<'_>,
    fields: &NewItem,
    progress: &ItemProgress,
    today: NaiveDate,
) -> Result<i64> {
    let status = Status::for_review_count(progress.review_count);
    tx.execute(
        "INSERT INTO vocab_items (
            kind, content, pronunciation, definition, translation, example,
            original_context, usage_note, synonyms, key_phrases, memory_trick, fun_fact,
            added_date, review_count, last_reviewed, status, archived_date
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            fields.resolved_kind().as_str(),
            fields.content,
            fields.pronunciation,
            fields.definition,
            fields.translation,
            fields.example,
            fields.original_context,
            fields.usage_note,
            serde_json::to_string(&fields.synonyms)?,
            serde_json::to_string(&fields.key_phrases)?,
            fields.memory_trick,
            fields.fun_fact,
            format_date(fields.added_date.unwrap_or(today)),
            progress.review_count,
            progress.last_reviewed.map(format_date),
            status.as_str(),
            progress.archived_date.map(format_date),
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

/// Map of normalized content to item id, for duplicate detection.
///
/// Normalization happens in Rust so non-ASCII case folding matches
/// [`normalize_content`]. The lowest id wins when duplicates already exist.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn content_index(conn: &Connection) -> Result<HashMap<String, i64>> {
    let mut stmt = conn.prepare("SELECT id, content FROM vocab_items ORDER BY id DESC")?;
    let index = stmt
        .query_map([], |row| {
            Ok((normalize_content(&row.get::<_, String>(1)?), row.get(0)?))
        })?
        .collect::<std::result::Result<HashMap<_, _>, _>>()?;
    Ok(index)
}

fn item_from_row(row: &rusqlite::Row) -> rusqlite::Result<VocabItem> {
    Ok(VocabItem {
        id: row.get(0)?,
        kind: parse_column(row, 1, |s| s.parse::<ItemKind>())?,
        content: row.get(2)?,
        pronunciation: row.get(3)?,
        definition: row.get(4)?,
        translation: row.get(5)?,
        example: row.get(6)?,
        original_context: row.get(7)?,
        usage_note: row.get(8)?,
        synonyms: parse_column(row, 9, |s| serde_json::from_str::<Vec<String>>(s))?,
        key_phrases: parse_column(row, 10, |s| serde_json::from_str::<Vec<String>>(s))?,
        memory_trick: row.get(11)?,
        fun_fact: row.get(12)?,
        added_date: parse_column(row, 13, |s| util::parse_date("added_date", s))?,
        review_count: row.get(14)?,
        last_reviewed: parse_optional_date(row, 15)?,
        status: parse_column(row, 16, |s| s.parse::<Status>())?,
        archived_date: parse_optional_date(row, 17)?,
    })
}

/// Decode a TEXT column, surfacing bad data as a conversion error.
fn parse_column<T, E, F>(row: &rusqlite::Row, idx: usize, parse: F) -> rusqlite::Result<T>
where
    F: FnOnce(&str) -> std::result::Result<T, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) if !raw.trim().is_empty() => util::parse_date("date", &raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        _ => Ok(None),
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }

    Utc::now()
}
