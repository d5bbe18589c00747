//! Command-line interface definitions.

pub mod commands;

use crate::config::CliOverrides;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Spaced-repetition vocabulary reviewer.
#[derive(Parser, Debug)]
#[command(name = "vocab", version, about, long_about = None)]
pub struct Cli {
    /// Database path (default: .vocab/vocab.db)
    #[arg(long, global = true, env = "VOCAB_DB")]
    pub db: Option<PathBuf>,

    /// Emit JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// SQLite busy timeout in milliseconds
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            lock_timeout: self.lock_timeout,
            ..CliOverrides::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .vocab workspace in the current directory
    Init(InitArgs),
    /// Add a word, phrase, or sentence
    Add(AddArgs),
    /// Show the items due for review
    Due(DueArgs),
    /// Record that items were reviewed
    Review(ReviewArgs),
    /// Archive mastered items not reviewed recently
    Archive(ArchiveArgs),
    /// Show one item with its history
    Show(ShowArgs),
    /// List items
    List(ListArgs),
    /// Show an item's event history
    History(ShowArgs),
    /// Show counts by status
    Stats,
    /// Import items from JSON or JSONL
    Import(ImportArgs),
    /// Export all items as JSONL
    Export(ExportArgs),
    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Re-initialize an existing workspace (keeps data)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    /// The word, phrase, or sentence to learn
    pub content: String,

    /// word, phrase, or sentence (inferred when omitted)
    #[arg(long)]
    pub kind: Option<String>,

    #[arg(long)]
    pub pronunciation: Option<String>,

    /// Definition in the target language
    #[arg(long)]
    pub definition: Option<String>,

    /// Definition in the learner's native language
    #[arg(long)]
    pub translation: Option<String>,

    #[arg(long)]
    pub example: Option<String>,

    /// Where the item was encountered
    #[arg(long = "context")]
    pub original_context: Option<String>,

    /// When to use it
    #[arg(long = "usage")]
    pub usage_note: Option<String>,

    /// Synonym or alternative (repeatable)
    #[arg(long = "synonym")]
    pub synonyms: Vec<String>,

    /// Key phrase (repeatable)
    #[arg(long = "key-phrase")]
    pub key_phrases: Vec<String>,

    #[arg(long)]
    pub memory_trick: Option<String>,

    #[arg(long)]
    pub fun_fact: Option<String>,

    /// Add even if the same content already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Default)]
pub struct DueArgs {
    /// Maximum items (default: items-per-review)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Record the batch as reviewed today
    #[arg(long)]
    pub mark_reviewed: bool,

    /// One line per item instead of full cards
    #[arg(long)]
    pub brief: bool,
}

#[derive(Args, Debug, Default)]
pub struct ReviewArgs {
    /// Item ids that were reviewed
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,

    /// Review date (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ArchiveArgs {
    /// Days since last review (default: archive-days-threshold)
    #[arg(long)]
    pub days: Option<u32>,
}

#[derive(Args, Debug, Default)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Filter by status (repeatable)
    #[arg(long, short = 's')]
    pub status: Vec<String>,

    /// Filter by kind (repeatable)
    #[arg(long)]
    pub kind: Vec<String>,

    /// Include archived items
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Only archived items
    #[arg(long, conflicts_with = "all")]
    pub archived: bool,

    /// Case-insensitive content substring
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    /// JSON document, JSON array, or JSONL file
    pub path: PathBuf,

    /// Keep review counts and dates from the file
    #[arg(long)]
    pub preserve_progress: bool,
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    pub path: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration
    List,
    /// Print one value
    Get { key: String },
    /// Store a value in the database config table
    Set { key: String, value: String },
}
