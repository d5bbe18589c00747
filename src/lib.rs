//! `vocab_review` - Spaced-repetition vocabulary scheduler
//!
//! This crate provides the core functionality for the `vocab` CLI tool:
//! a persistent store of vocabulary items and a deterministic review
//! scheduler that promotes items through learning, reviewing, and mastered
//! tiers as they are reviewed.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (VocabItem, NewItem, Status, Event)
//! - [`storage`] - `SQLite` database layer and the [`storage::ItemStore`] boundary
//! - [`scheduler`] - Due selection, review recording, archival sweep
//! - [`sync`] - JSON/JSONL import and export
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)
//! - [`util`] - Date and content helpers

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod storage;
pub mod sync;
pub mod util;

pub use error::{ErrorCode, Result, StructuredError, VocabError};
pub use model::{NewItem, Status, VocabItem};
pub use scheduler::{ReviewScheduler, SchedulerConfig};
pub use storage::{ItemStore, SqliteStorage};
