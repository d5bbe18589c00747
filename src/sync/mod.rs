//! JSON/JSONL import and export for `vocab_review`.
//!
//! This module handles:
//! - Import: legacy `{ "items": [...] }` documents, bare JSON arrays, or JSONL
//!   into `SQLite`, deduplicating by case-insensitive content
//! - Export: `SQLite` -> JSONL, one item per line, written atomically

use crate::error::{Result, VocabError};
use crate::model::{EventType, NewItem, VocabItem, deserialize_lenient_date};
use crate::storage::sqlite::{content_index, insert_item};
use crate::storage::{ItemProgress, ListFilters, SqliteStorage};
use crate::util::{self, normalize_content};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for importing items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportConfig {
    /// Carry over review counts and dates instead of starting fresh.
    pub preserve_progress: bool,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped_duplicates: usize,
    pub skipped_invalid: usize,
}

/// One record as found in an import file.
///
/// Extra keys such as `id` or `status` are ignored; ids are reassigned by the
/// store and status is always recomputed from `review_count`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
    #[serde(flatten)]
    pub fields: NewItem,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub last_reviewed: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_lenient_date")]
    pub archived_date: Option<NaiveDate>,
}

impl ImportRecord {
    fn progress(&self) -> ItemProgress {
        ItemProgress {
            review_count: self.review_count.unwrap_or(0),
            last_reviewed: self.last_reviewed,
            archived_date: self.archived_date,
        }
    }
}

/// Read raw records from a file in any supported layout.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a JSONL line is not valid JSON.
pub fn read_records(path: &Path) -> Result<Vec<serde_json::Value>> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}

fn parse_records(contents: &str) -> Result<Vec<serde_json::Value>> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return Ok(match value {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("items") {
                Some(serde_json::Value::Array(items)) => items,
                Some(other) => {
                    return Err(VocabError::validation(
                        "items",
                        format!("expected an array, found {other}"),
                    ));
                }
                None => vec![serde_json::Value::Object(map)],
            },
            other => {
                return Err(VocabError::validation(
                    "document",
                    format!("expected an object or array, found {other}"),
                ));
            }
        });
    }

    // Not a single JSON document: treat as JSONL.
    let mut records = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|e| {
            VocabError::validation(format!("line {}", idx + 1), e.to_string())
        })?;
        records.push(value);
    }
    Ok(records)
}

/// First progress date field that is present but not a date.
///
/// Such a record would keep its review count with no `last_reviewed`, so the
/// archive sweep could never reach it.
fn unparseable_progress_date(raw: &serde_json::Value) -> Option<&'static str> {
    ["last_reviewed", "archived_date"].into_iter().find(|&field| {
        raw.get(field)
            .and_then(serde_json::Value::as_str)
            .is_some_and(|s| !s.trim().is_empty() && util::parse_date(field, s).is_err())
    })
}

/// Import items from `path` in a single transaction.
///
/// Records whose content matches an existing item (or an earlier record in the
/// same file) case-insensitively are skipped. Records without usable content,
/// or with an unreadable progress date when progress is preserved, are
/// skipped and counted as invalid.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or the transaction fails;
/// in that case nothing is imported.
pub fn import_from_json(
    storage: &mut SqliteStorage,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportResult> {
    let records = read_records(path)?;
    debug!(path = %path.display(), records = records.len(), "Read import records");
    import_records(storage, records, config, &path.display().to_string())
}

/// Import already-parsed records. See [`import_from_json`].
///
/// # Errors
///
/// Returns an error if the transaction fails; nothing is imported then.
pub fn import_records(
    storage: &mut SqliteStorage,
    records: Vec<serde_json::Value>,
    config: &ImportConfig,
    source: &str,
) -> Result<ImportResult> {
    let today = util::today();

    let result = storage.mutate("import", |tx, ctx| {
        let mut known = content_index(tx)?;
        let mut result = ImportResult::default();

        for (idx, raw) in records.into_iter().enumerate() {
            if config.preserve_progress {
                if let Some(field) = unparseable_progress_date(&raw) {
                    warn!(record = idx + 1, field, "Skipping record with unreadable date");
                    result.skipped_invalid += 1;
                    continue;
                }
            }

            let record: ImportRecord = match serde_json::from_value(raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(record = idx + 1, error = %e, "Skipping malformed record");
                    result.skipped_invalid += 1;
                    continue;
                }
            };

            if record.fields.validate().is_err() {
                result.skipped_invalid += 1;
                continue;
            }

            let key = normalize_content(&record.fields.content);
            if known.contains_key(&key) {
                result.skipped_duplicates += 1;
                continue;
            }

            let progress = if config.preserve_progress {
                record.progress()
            } else {
                ItemProgress::default()
            };
            let id = insert_item(tx, &record.fields, &progress, today)?;
            ctx.record_event(
                EventType::Imported,
                id,
                Some(format!("Imported from {source}")),
            );
            known.insert(key, id);
            result.imported += 1;
        }

        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('last_import', ?)",
            [format!("{} {source}", util::format_date(today))],
        )?;
        Ok(result)
    })?;

    info!(
        imported = result.imported,
        duplicates = result.skipped_duplicates,
        invalid = result.skipped_invalid,
        "Import finished"
    );
    Ok(result)
}

/// Export every item, archived included, as JSONL ordered by id.
///
/// The file is written to a sibling temp path and renamed into place, so a
/// failed export never leaves a truncated file behind.
///
/// # Errors
///
/// Returns an error if the items cannot be read or the file cannot be written.
pub fn export_to_jsonl(storage: &SqliteStorage, output_path: &Path) -> Result<usize> {
    let items = storage.list_items(&ListFilters {
        include_archived: true,
        ..ListFilters::default()
    })?;

    let temp_path = output_path.with_extension("jsonl.tmp");
    let written = write_jsonl(&temp_path, &items)
        .and_then(|()| fs::rename(&temp_path, output_path).map_err(VocabError::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    info!(path = %output_path.display(), count = items.len(), "Exported items");
    Ok(items.len())
}

fn write_jsonl(path: &Path, items: &[VocabItem]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
