//! Error types for `vocab_review`.
//!
//! All fallible library operations return [`Result`]. The CLI maps each
//! [`VocabError`] onto a stable [`ErrorCode`] so scripts can branch on the
//! failure kind, and prints a [`StructuredError`] when `--json` is active.

use serde::Serialize;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, VocabError>;

/// Everything that can go wrong inside the scheduler and its store.
#[derive(Debug, Error)]
pub enum VocabError {
    /// Malformed input rejected before any write.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A single-item lookup targeted a record that does not exist.
    #[error("Item not found: {id}")]
    NotFound { id: i64 },

    /// Underlying persistence failure (I/O, corruption, schema mismatch).
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No .vocab directory found (run `vocab init` first)")]
    NotInitialized,

    #[error("Workspace already initialized at {path}")]
    AlreadyInitialized { path: String },
}

impl VocabError {
    /// Convenience constructor for validation failures.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable classification of this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::Validation,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Database(_) => ErrorCode::Store,
            Self::Io(_) => ErrorCode::Io,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::Parse,
            Self::Config(_) => ErrorCode::Config,
            Self::NotInitialized | Self::AlreadyInitialized { .. } => ErrorCode::Workspace,
        }
    }

    /// Optional remediation hint shown alongside the message.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `vocab init` in your project directory"),
            Self::NotFound { .. } => Some("Use `vocab list --all` to see known item ids"),
            Self::Validation { .. } => Some("Check the supplied fields and try again"),
            _ => None,
        }
    }
}

/// Stable error classification used for exit codes and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Store,
    Io,
    Parse,
    Config,
    Workspace,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Store => "store",
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Config => "config",
            Self::Workspace => "workspace",
        }
    }

    /// Process exit code for this error class.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Validation | Self::Config => 2,
            Self::NotFound => 3,
            Self::Workspace => 4,
            Self::Store | Self::Io | Self::Parse => 1,
        }
    }
}

/// JSON shape for errors reported in `--json` mode.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<&VocabError> for StructuredError {
    fn from(err: &VocabError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            hint: err.hint().map(str::to_string),
        }
    }
}
