//! Plain-text rendering of items and events.

use crate::model::{Event, Status, VocabItem};
use crate::util::format_date;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Truncate `content` to at most `max_width` terminal columns.
///
/// Width is measured in display columns, so CJK text is cut at half the
/// character count of ASCII text.
#[must_use]
pub fn truncate_content(content: &str, max_width: usize) -> String {
    let content = content.trim();
    if content.width() <= max_width {
        return content.to_string();
    }
    if max_width <= ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let budget = max_width - ELLIPSIS.len();
    let mut used = 0;
    let mut out = String::new();
    for ch in content.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str(ELLIPSIS);
    out
}

#[must_use]
pub const fn format_status_badge(status: Status) -> &'static str {
    match status {
        Status::Learning => "[L]",
        Status::Reviewing => "[R]",
        Status::Mastered => "[M]",
    }
}

/// `"s"` unless `n == 1`.
#[must_use]
pub const fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// One-line summary used by `list` and `due`.
#[must_use]
pub fn format_item_line(item: &VocabItem, max_content_width: usize) -> String {
    let last = item
        .last_reviewed
        .map_or_else(|| "never".to_string(), format_date);
    let mut line = format!(
        "{} #{} {} ({}x, last {last})",
        format_status_badge(item.status),
        item.id,
        truncate_content(&item.content, max_content_width),
        item.review_count,
    );
    if let Some(archived) = item.archived_date {
        line.push_str(&format!(" archived {}", format_date(archived)));
    }
    line
}

/// Multi-line card with every populated field, used by `show` and `due`.
#[must_use]
pub fn format_item_card(item: &VocabItem) -> String {
    let mut out = format!(
        "#{} {} [{}, {}]\n",
        item.id,
        item.content,
        item.kind.as_str(),
        item.status
    );

    let text_fields = [
        ("Pronunciation", &item.pronunciation),
        ("Definition", &item.definition),
        ("Translation", &item.translation),
        ("Example", &item.example),
        ("Context", &item.original_context),
        ("Usage", &item.usage_note),
        ("Memory trick", &item.memory_trick),
        ("Fun fact", &item.fun_fact),
    ];
    for (label, value) in text_fields {
        if !value.is_empty() {
            out.push_str(&format!("  {label}: {value}\n"));
        }
    }
    for (label, values) in [("Synonyms", &item.synonyms), ("Key phrases", &item.key_phrases)] {
        if !values.is_empty() {
            out.push_str(&format!("  {label}: {}\n", values.join(", ")));
        }
    }

    out.push_str(&format!(
        "  Added {}, reviewed {} time{}",
        format_date(item.added_date),
        item.review_count,
        plural(item.review_count as usize)
    ));
    if let Some(last) = item.last_reviewed {
        out.push_str(&format!(", last on {}", format_date(last)));
    }
    if let Some(archived) = item.archived_date {
        out.push_str(&format!("\n  Archived {}", format_date(archived)));
    }
    out
}

#[must_use]
pub fn format_event_line(event: &Event) -> String {
    let when = event.created_at.format("%Y-%m-%d %H:%M");
    let mut line = format!("{when}  {}", event.event_type.as_str());
    match (&event.old_value, &event.new_value) {
        (Some(old), Some(new)) => line.push_str(&format!("  {old} -> {new}")),
        (None, Some(new)) => line.push_str(&format!("  {new}")),
        _ => {}
    }
    if let Some(comment) = &event.comment {
        line.push_str(&format!("  ({comment})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;
    use chrono::NaiveDate;

    fn item(content: &str) -> VocabItem {
        VocabItem {
            id: 4,
            kind: ItemKind::infer(content),
            content: content.to_string(),
            pronunciation: String::new(),
            definition: "showing great care".to_string(),
            translation: String::new(),
            example: String::new(),
            original_context: String::new(),
            usage_note: String::new(),
            synonyms: vec!["careful".to_string(), "thorough".to_string()],
            key_phrases: Vec::new(),
            memory_trick: String::new(),
            fun_fact: String::new(),
            added_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            review_count: 3,
            last_reviewed: NaiveDate::from_ymd_opt(2025, 2, 1),
            status: Status::Reviewing,
            archived_date: None,
        }
    }

    #[test]
    fn truncate_short_content_unchanged() {
        assert_eq!(truncate_content("  meticulous ", 20), "meticulous");
    }

    #[test]
    fn truncate_long_content() {
        assert_eq!(truncate_content("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_content("abcdefghij", 2), "..");
    }

    #[test]
    fn truncate_counts_wide_characters() {
        // Each CJK character takes two columns.
        assert_eq!(truncate_content("学习新的单词", 7), "学习...");
    }

    #[test]
    fn item_line_shows_progress() {
        let line = format_item_line(&item("meticulous"), 40);
        assert_eq!(line, "[R] #4 meticulous (3x, last 2025-02-01)");
    }

    #[test]
    fn card_lists_populated_fields_only() {
        let card = format_item_card(&item("meticulous"));
        assert!(card.contains("Definition: showing great care"));
        assert!(card.contains("Synonyms: careful, thorough"));
        assert!(!card.contains("Pronunciation"));
        assert!(card.contains("reviewed 3 times, last on 2025-02-01"));
    }
}
