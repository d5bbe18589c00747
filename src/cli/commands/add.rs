//! Add command implementation.

use super::Workspace;
use crate::cli::AddArgs;
use crate::config::CliOverrides;
use crate::error::{Result, VocabError};
use crate::model::{ItemKind, NewItem};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Serialize)]
struct AddOutput {
    id: i64,
    content: String,
    kind: ItemKind,
}

/// Execute the add command.
///
/// # Errors
///
/// Returns a validation error for empty content, an unknown kind, or a
/// duplicate without `--force`; otherwise a store error.
pub fn execute(args: &AddArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let fields = new_item_from_args(args)?;
    fields.validate()?;

    let mut ws = Workspace::open(cli)?;

    if !args.force {
        if let Some(existing) = ws.storage.find_by_content(&fields.content)? {
            return Err(VocabError::validation(
                "content",
                format!(
                    "'{}' already exists as #{} (use --force to add anyway)",
                    existing.content, existing.id
                ),
            ));
        }
    }

    let id = ws.storage.add(&fields)?;
    info!(id, "Added item");

    let output = AddOutput {
        id,
        content: fields.content.clone(),
        kind: fields.resolved_kind(),
    };
    if json {
        super::print_json(&output)?;
    } else {
        println!("Added #{} {} ({})", output.id, output.content, output.kind.as_str());
    }
    Ok(())
}

fn new_item_from_args(args: &AddArgs) -> Result<NewItem> {
    let kind = args.kind.as_deref().map(str::parse::<ItemKind>).transpose()?;
    debug!(?kind, "Parsed add arguments");

    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();
    Ok(NewItem {
        kind,
        content: args.content.clone(),
        pronunciation: text(&args.pronunciation),
        definition: text(&args.definition),
        translation: text(&args.translation),
        example: text(&args.example),
        original_context: text(&args.original_context),
        usage_note: text(&args.usage_note),
        synonyms: clean_list(&args.synonyms),
        key_phrases: clean_list(&args.key_phrases),
        memory_trick: text(&args.memory_trick),
        fun_fact: text(&args.fun_fact),
        added_date: None,
    })
}

fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
