//! Database schema definitions and migration logic.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the vocabulary database.
pub const SCHEMA_SQL: &str = r"
    -- Vocabulary items
    -- Descriptive TEXT fields default to '' and list fields to a JSON '[]'.
    CREATE TABLE IF NOT EXISTS vocab_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL DEFAULT 'word' CHECK(kind IN ('word', 'phrase', 'sentence')),
        content TEXT NOT NULL CHECK(length(trim(content)) > 0),
        pronunciation TEXT NOT NULL DEFAULT '',
        definition TEXT NOT NULL DEFAULT '',
        translation TEXT NOT NULL DEFAULT '',
        example TEXT NOT NULL DEFAULT '',
        original_context TEXT NOT NULL DEFAULT '',
        usage_note TEXT NOT NULL DEFAULT '',
        synonyms TEXT NOT NULL DEFAULT '[]',
        key_phrases TEXT NOT NULL DEFAULT '[]',
        memory_trick TEXT NOT NULL DEFAULT '',
        fun_fact TEXT NOT NULL DEFAULT '',
        added_date TEXT NOT NULL,
        review_count INTEGER NOT NULL DEFAULT 0 CHECK(review_count >= 0),
        last_reviewed TEXT,
        status TEXT NOT NULL DEFAULT 'learning',
        archived_date TEXT,
        -- Status invariant: the tier is a function of review_count
        CHECK (
            (status = 'learning' AND review_count < 3) OR
            (status = 'reviewing' AND review_count >= 3 AND review_count < 7) OR
            (status = 'mastered' AND review_count >= 7)
        )
    );

    -- Primary access patterns
    CREATE INDEX IF NOT EXISTS idx_vocab_status ON vocab_items(status);
    CREATE INDEX IF NOT EXISTS idx_vocab_review_count ON vocab_items(review_count);
    CREATE INDEX IF NOT EXISTS idx_vocab_last_reviewed ON vocab_items(last_reviewed);
    CREATE INDEX IF NOT EXISTS idx_vocab_added_date ON vocab_items(added_date);
    CREATE INDEX IF NOT EXISTS idx_vocab_content_nocase ON vocab_items(content COLLATE NOCASE);

    -- Due selection composite index (active items only)
    CREATE INDEX IF NOT EXISTS idx_vocab_due
        ON vocab_items(status, review_count, last_reviewed)
        WHERE archived_date IS NULL;

    -- Events (Audit)
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL,
        event_type TEXT NOT NULL,
        old_value TEXT,
        new_value TEXT,
        comment TEXT,
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (item_id) REFERENCES vocab_items(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_events_item ON events(item_id);
    CREATE INDEX IF NOT EXISTS idx_events_type ON events(event_type);
    CREATE INDEX IF NOT EXISTS idx_events_created_at ON events(created_at);

    -- Config (Runtime)
    CREATE TABLE IF NOT EXISTS config (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- Metadata
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // Older databases may lack columns that the indexes below reference.
    run_pre_schema_migrations(conn)?;

    conn.execute_batch(SCHEMA_SQL)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    // NORMAL synchronous is safe with WAL: committed data survives OS crash
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")
        .and_then(|mut stmt| stmt.exists([table]))
        .unwrap_or(false)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    // pragma_table_info() needs the table name inline; callers only pass known tables.
    let sql = format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?");
    conn.prepare(&sql)
        .and_then(|mut stmt| stmt.exists([column]))
        .unwrap_or(false)
}

/// Columns added after the first release of the items table.
const ITEM_COLUMNS: &[(&str, &str)] = &[
    ("kind", "TEXT NOT NULL DEFAULT 'word'"),
    ("pronunciation", "TEXT NOT NULL DEFAULT ''"),
    ("definition", "TEXT NOT NULL DEFAULT ''"),
    ("translation", "TEXT NOT NULL DEFAULT ''"),
    ("example", "TEXT NOT NULL DEFAULT ''"),
    ("original_context", "TEXT NOT NULL DEFAULT ''"),
    ("usage_note", "TEXT NOT NULL DEFAULT ''"),
    ("synonyms", "TEXT NOT NULL DEFAULT '[]'"),
    ("key_phrases", "TEXT NOT NULL DEFAULT '[]'"),
    ("memory_trick", "TEXT NOT NULL DEFAULT ''"),
    ("fun_fact", "TEXT NOT NULL DEFAULT ''"),
    ("review_count", "INTEGER NOT NULL DEFAULT 0"),
    ("last_reviewed", "TEXT"),
    ("status", "TEXT NOT NULL DEFAULT 'learning'"),
    ("archived_date", "TEXT"),
];

const EVENT_COLUMNS: &[(&str, &str)] = &[
    ("old_value", "TEXT"),
    ("new_value", "TEXT"),
    ("comment", "TEXT"),
    ("created_at", "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP"),
];

fn ensure_columns(conn: &Connection, table: &str, columns: &[(&str, &str)]) -> Result<()> {
    if !table_exists(conn, table) {
        return Ok(());
    }

    for (name, definition) in columns {
        if !column_exists(conn, table, name) {
            let sql = format!("ALTER TABLE {table} ADD COLUMN {name} {definition}");
            conn.execute(&sql, [])?;
        }
    }

    Ok(())
}

/// Bring legacy tables up to the columns `SCHEMA_SQL` indexes.
///
/// Must run before `execute_batch(SCHEMA_SQL)`, whose CREATE INDEX statements
/// fail on tables missing the indexed columns.
fn run_pre_schema_migrations(conn: &Connection) -> Result<()> {
    ensure_columns(conn, "vocab_items", ITEM_COLUMNS)?;
    ensure_columns(conn, "events", EVENT_COLUMNS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::collections::HashSet;

    fn names(conn: &Connection, kind: &str) -> HashSet<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<Result<HashSet<_>>>()
            .unwrap()
    }

    #[test]
    fn test_apply_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).expect("Failed to apply schema");

        let tables = names(&conn, "table");
        for table in ["vocab_items", "events", "config", "metadata"] {
            assert!(tables.contains(table), "missing table {table}");
        }

        let indexes = names(&conn, "index");
        for index in [
            "idx_vocab_status",
            "idx_vocab_review_count",
            "idx_vocab_last_reviewed",
            "idx_vocab_added_date",
            "idx_vocab_due",
        ] {
            assert!(indexes.contains(index), "missing index {index}");
        }

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        // In-memory DBs use MEMORY journaling, regardless of what we set
        assert!(journal_mode.to_uppercase() == "WAL" || journal_mode.to_uppercase() == "MEMORY");

        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_apply_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO vocab_items (content, added_date) VALUES ('keep me', '2025-01-01')",
            [],
        )
        .unwrap();

        apply_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT count(*) FROM vocab_items", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_status_check_rejects_inconsistent_rows() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let bad = conn.execute(
            "INSERT INTO vocab_items (content, added_date, review_count, status)
             VALUES ('x', '2025-01-01', 1, 'mastered')",
            [],
        );
        assert!(bad.is_err(), "mastered with one review must be rejected");

        let good = conn.execute(
            "INSERT INTO vocab_items (content, added_date, review_count, status)
             VALUES ('x', '2025-01-01', 7, 'mastered')",
            [],
        );
        assert!(good.is_ok());
    }

    #[test]
    fn test_status_check_matches_model_thresholds() {
        use crate::model::Status;

        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        for count in 0..12u32 {
            let status = Status::for_review_count(count);
            conn.execute(
                "INSERT INTO vocab_items (content, added_date, review_count, status)
                 VALUES ('t', '2025-01-01', ?, ?)",
                rusqlite::params![count, status.as_str()],
            )
            .unwrap_or_else(|e| panic!("count {count} / {status} rejected: {e}"));
        }
    }

    #[test]
    fn test_empty_content_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO vocab_items (content, added_date) VALUES ('   ', '2025-01-01')",
            [],
        );
        assert!(result.is_err());
    }

    /// Migration: add missing item columns for older schemas.
    #[test]
    fn test_migration_adds_missing_item_columns() {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute_batch(
            r"
            CREATE TABLE vocab_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                added_date TEXT NOT NULL
            );
        ",
        )
        .unwrap();

        apply_schema(&conn).unwrap();

        let cols: Vec<String> = conn
            .prepare("PRAGMA table_info('vocab_items')")
            .unwrap()
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        for column in ["kind", "usage_note", "key_phrases", "status", "archived_date"] {
            assert!(
                cols.contains(&column.to_string()),
                "missing column {column}"
            );
        }
    }
}
