//! Core data types for `vocab_review`.
//!
//! - [`VocabItem`] - a stored learnable unit with its review metadata
//! - [`NewItem`] - the caller-supplied fields for creating an item
//! - [`Status`] - review tier derived from the review count
//! - [`ItemKind`] - word, phrase, or sentence
//! - [`Event`] - audit record of a mutation

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VocabError};

/// Review count at which an item moves from learning to reviewing.
pub const REVIEWING_THRESHOLD: u32 = 3;
/// Review count at which an item becomes mastered.
pub const MASTERED_THRESHOLD: u32 = 7;

/// Review tier of an item.
///
/// Always a function of the item's review count; see [`Status::for_review_count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Learning,
    Reviewing,
    Mastered,
}

impl Status {
    /// Derive the tier for a cumulative review count.
    #[must_use]
    pub const fn for_review_count(review_count: u32) -> Self {
        if review_count >= MASTERED_THRESHOLD {
            Self::Mastered
        } else if review_count >= REVIEWING_THRESHOLD {
            Self::Reviewing
        } else {
            Self::Learning
        }
    }

    /// Selection priority: lower tiers surface first.
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Learning => 0,
            Self::Reviewing => 1,
            Self::Mastered => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Reviewing => "reviewing",
            Self::Mastered => "mastered",
        }
    }

    pub const ALL: [Self; 3] = [Self::Learning, Self::Reviewing, Self::Mastered];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learning" => Ok(Self::Learning),
            "reviewing" => Ok(Self::Reviewing),
            "mastered" => Ok(Self::Mastered),
            other => Err(VocabError::validation(
                "status",
                format!("unknown status '{other}' (expected learning, reviewing, mastered)"),
            )),
        }
    }
}

/// What kind of unit an item is. Affects presentation only, never scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Word,
    Phrase,
    #[serde(alias = "paragraph")]
    Sentence,
}

impl ItemKind {
    /// Guess a kind from raw content: anything with inner whitespace is a phrase.
    #[must_use]
    pub fn infer(content: &str) -> Self {
        if content.trim().contains(char::is_whitespace) {
            Self::Phrase
        } else {
            Self::Word
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Phrase => "phrase",
            Self::Sentence => "sentence",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "phrase" => Ok(Self::Phrase),
            "sentence" | "paragraph" => Ok(Self::Sentence),
            other => Err(VocabError::validation(
                "kind",
                format!("unknown kind '{other}' (expected word, phrase, sentence)"),
            )),
        }
    }
}

/// A stored vocabulary item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabItem {
    pub id: i64,
    pub kind: ItemKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pronunciation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub definition: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub example: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_context: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage_note: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_phrases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_trick: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fun_fact: String,
    pub added_date: NaiveDate,
    pub review_count: u32,
    pub last_reviewed: Option<NaiveDate>,
    pub status: Status,
    pub archived_date: Option<NaiveDate>,
}

impl VocabItem {
    /// Not archived, so eligible for selection.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.archived_date.is_none()
    }

    /// Composite key the due batch is ordered by (ascending).
    ///
    /// `None` sorts before any date, so never-reviewed items come first among
    /// equal counts; `id` makes the order total.
    #[must_use]
    pub fn due_order_key(&self) -> (u8, u32, Option<NaiveDate>, i64) {
        (
            self.status.tier(),
            self.review_count,
            self.last_reviewed,
            self.id,
        )
    }
}

/// Fields supplied when adding an item.
///
/// Legacy key names (`type`, `ipa`, `english`, `chinese`, `context`,
/// `alternatives`) are accepted so old vocabulary files import unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewItem {
    #[serde(alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    pub content: String,
    #[serde(alias = "ipa")]
    pub pronunciation: String,
    #[serde(alias = "english")]
    pub definition: String,
    #[serde(alias = "chinese")]
    pub translation: String,
    pub example: String,
    pub original_context: String,
    #[serde(alias = "context")]
    pub usage_note: String,
    #[serde(alias = "alternatives")]
    pub synonyms: Vec<String>,
    pub key_phrases: Vec<String>,
    pub memory_trick: String,
    pub fun_fact: String,
    #[serde(
        deserialize_with = "deserialize_lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub added_date: Option<NaiveDate>,
}

impl NewItem {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Reject input that may not be written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `content` is empty or whitespace.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(VocabError::validation("content", "must not be empty"));
        }
        Ok(())
    }

    /// Explicit kind, or one inferred from the content.
    #[must_use]
    pub fn resolved_kind(&self) -> ItemKind {
        self.kind.unwrap_or_else(|| ItemKind::infer(&self.content))
    }
}

/// Treat empty strings and unparseable values as "not supplied".
pub(crate) fn deserialize_lenient_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| crate::util::parse_date("date", s).ok()))
}

/// Kind of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Imported,
    Reviewed,
    Archived,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Imported => "imported",
            Self::Reviewed => "reviewed",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for EventType {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created" => Ok(Self::Created),
            "imported" => Ok(Self::Imported),
            "reviewed" => Ok(Self::Reviewed),
            "archived" => Ok(Self::Archived),
            other => Err(VocabError::validation(
                "event_type",
                format!("unknown event type '{other}'"),
            )),
        }
    }
}

/// One row of an item's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: i64,
    pub item_id: i64,
    pub event_type: EventType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(Status::for_review_count(0), Status::Learning);
        assert_eq!(Status::for_review_count(2), Status::Learning);
        assert_eq!(Status::for_review_count(3), Status::Reviewing);
        assert_eq!(Status::for_review_count(6), Status::Reviewing);
        assert_eq!(Status::for_review_count(7), Status::Mastered);
        assert_eq!(Status::for_review_count(250), Status::Mastered);
    }

    #[test]
    fn status_tiers_are_ordered() {
        let tiers: Vec<u8> = Status::ALL.iter().map(|s| s.tier()).collect();
        assert_eq!(tiers, vec![0, 1, 2]);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("retired".parse::<Status>().is_err());
    }

    #[test]
    fn kind_inference_and_aliases() {
        assert_eq!(ItemKind::infer("ubiquitous"), ItemKind::Word);
        assert_eq!(ItemKind::infer("  ubiquitous  "), ItemKind::Word);
        assert_eq!(ItemKind::infer("break a leg"), ItemKind::Phrase);
        assert_eq!("paragraph".parse::<ItemKind>().unwrap(), ItemKind::Sentence);
        assert_eq!("Phrase".parse::<ItemKind>().unwrap(), ItemKind::Phrase);
    }

    #[test]
    fn new_item_requires_content() {
        assert!(NewItem::new("").validate().is_err());
        assert!(NewItem::new("   \t").validate().is_err());
        assert!(NewItem::new("gist").validate().is_ok());
    }

    #[test]
    fn new_item_accepts_legacy_keys() {
        let json = r#"{
            "type": "phrase",
            "content": "under the weather",
            "ipa": "/ˈʌndər/",
            "english": "slightly ill",
            "chinese": "身体不适",
            "alternatives": ["off colour"],
            "added_date": ""
        }"#;
        let item: NewItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, Some(ItemKind::Phrase));
        assert_eq!(item.pronunciation, "/ˈʌndər/");
        assert_eq!(item.definition, "slightly ill");
        assert_eq!(item.translation, "身体不适");
        assert_eq!(item.synonyms, vec!["off colour".to_string()]);
        assert_eq!(item.added_date, None);
    }

    #[test]
    fn due_order_key_puts_unreviewed_first() {
        let base = VocabItem {
            id: 1,
            kind: ItemKind::Word,
            content: "a".into(),
            pronunciation: String::new(),
            definition: String::new(),
            translation: String::new(),
            example: String::new(),
            original_context: String::new(),
            usage_note: String::new(),
            synonyms: vec![],
            key_phrases: vec![],
            memory_trick: String::new(),
            fun_fact: String::new(),
            added_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            review_count: 1,
            last_reviewed: NaiveDate::from_ymd_opt(2025, 1, 2),
            status: Status::Learning,
            archived_date: None,
        };
        let never = VocabItem {
            id: 2,
            last_reviewed: None,
            ..base.clone()
        };
        assert!(never.due_order_key() < base.due_order_key());
    }
}
