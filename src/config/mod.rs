//! Configuration management for `vocab_review`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`VOCAB_*`)
//! 3. Project config (.vocab/config.yaml)
//! 4. User config (~/.config/vocab/config.yaml)
//! 5. DB config table
//! 6. Defaults
//!
//! The merged layer is turned into an explicit [`SchedulerConfig`] value that
//! is handed to the scheduler; nothing reads configuration ambiently.

use crate::error::{Result, VocabError};
use crate::scheduler::{
    DEFAULT_ARCHIVE_DAYS_THRESHOLD, DEFAULT_ITEMS_PER_REVIEW, SchedulerConfig,
};
use crate::storage::SqliteStorage;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project workspace directory.
pub const VOCAB_DIR_NAME: &str = ".vocab";
/// Default database filename inside the workspace directory.
pub const DEFAULT_DB_FILENAME: &str = "vocab.db";

pub const KEY_ITEMS_PER_REVIEW: &str = "items-per-review";
pub const KEY_ARCHIVE_DAYS: &str = "archive-days-threshold";
pub const KEY_LOCK_TIMEOUT: &str = "lock-timeout";

/// Resolved paths for this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub vocab_dir: PathBuf,
    pub db_path: PathBuf,
}

impl ConfigPaths {
    /// Resolve the database path, honoring an explicit override.
    #[must_use]
    pub fn resolve(vocab_dir: &Path, db_override: Option<&PathBuf>) -> Self {
        let db_path = db_override
            .cloned()
            .unwrap_or_else(|| vocab_dir.join(DEFAULT_DB_FILENAME));
        Self {
            vocab_dir: vocab_dir.to_path_buf(),
            db_path,
        }
    }
}

/// Discover the active `.vocab` directory.
///
/// Honors `VOCAB_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns an error if no workspace directory is found or the CWD cannot be read.
pub fn discover_vocab_dir(start: Option<&Path>) -> Result<PathBuf> {
    discover_vocab_dir_with_env(start, None)
}

fn discover_vocab_dir_with_env(start: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    } else if let Ok(value) = env::var("VOCAB_DIR") {
        if !value.trim().is_empty() {
            let path = PathBuf::from(value);
            if path.is_dir() {
                return Ok(path);
            }
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(VOCAB_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(VocabError::NotInitialized)
}

/// Open storage using resolved config paths, returning the storage and paths used.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
pub fn open_storage(
    vocab_dir: &Path,
    db_override: Option<&PathBuf>,
    lock_timeout: Option<u64>,
) -> Result<(SqliteStorage, ConfigPaths)> {
    let paths = ConfigPaths::resolve(vocab_dir, db_override);
    let storage = SqliteStorage::open_with_timeout(&paths.db_path, lock_timeout)?;
    Ok((storage, paths))
}

/// A configuration layer split into startup-only and runtime (DB) keys.
///
/// Keys are stored normalized (lower-case, `_` replaced by `-`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub startup: HashMap<String, String>,
    pub runtime: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.startup {
            self.startup.insert(key.clone(), value.clone());
        }
        for (key, value) in &other.runtime {
            self.runtime.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `VOCAB_*` variables.
    ///
    /// `VOCAB_ITEMS_PER_REVIEW=10` becomes `items-per-review: 10`. `VOCAB_DIR`
    /// is consumed by workspace discovery and skipped here.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();

        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix("VOCAB_") else {
                continue;
            };
            if stripped.eq_ignore_ascii_case("DIR") {
                continue;
            }
            let normalized = match normalize_key(stripped).as_str() {
                "archive-days" => KEY_ARCHIVE_DAYS.to_string(),
                other => other.to_string(),
            };
            insert_key_value(&mut layer, &normalized, value);
        }

        layer
    }

    /// Build a layer from DB config table values.
    ///
    /// # Errors
    ///
    /// Returns an error if config table lookup fails.
    pub fn from_db(storage: &SqliteStorage) -> Result<Self> {
        let mut layer = Self::default();
        let map = storage.get_all_config()?;
        for (key, value) in map {
            if is_startup_key(&key) {
                continue;
            }
            layer.runtime.insert(normalize_key(&key), value);
        }
        Ok(layer)
    }

    /// Look up a key in either section.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        let key = normalize_key(key);
        self.runtime.get(&key).or_else(|| self.startup.get(&key))
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub lock_timeout: Option<u64>,
    pub items_per_review: Option<usize>,
    pub archive_days_threshold: Option<u32>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            insert_key_value(&mut layer, "db", path.to_string_lossy().to_string());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            insert_key_value(&mut layer, KEY_LOCK_TIMEOUT, lock_timeout.to_string());
        }
        if let Some(items) = self.items_per_review {
            insert_key_value(&mut layer, KEY_ITEMS_PER_REVIEW, items.to_string());
        }
        if let Some(days) = self.archive_days_threshold {
            insert_key_value(&mut layer, KEY_ARCHIVE_DAYS, days.to_string());
        }

        layer
    }
}

/// Load project config (.vocab/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(vocab_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&vocab_dir.join("config.yaml"))
}

/// Load user config (~/.config/vocab/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("vocab")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    insert_key_value(
        &mut layer,
        KEY_ITEMS_PER_REVIEW,
        DEFAULT_ITEMS_PER_REVIEW.to_string(),
    );
    insert_key_value(
        &mut layer,
        KEY_ARCHIVE_DAYS,
        DEFAULT_ARCHIVE_DAYS_THRESHOLD.to_string(),
    );
    layer
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or DB access fails.
pub fn load_config(
    vocab_dir: &Path,
    storage: Option<&SqliteStorage>,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let db_layer = match storage {
        Some(storage) => ConfigLayer::from_db(storage)?,
        None => ConfigLayer::default(),
    };
    let user = load_user_config()?;
    let project = load_project_config(vocab_dir)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, db_layer, user, project, env_layer, cli_layer,
    ]))
}

/// Build the scheduler's tunables from a merged config layer.
///
/// # Errors
///
/// Returns a config error if a value is present but not a valid number.
pub fn scheduler_config_from_layer(layer: &ConfigLayer) -> Result<SchedulerConfig> {
    let items_per_review =
        parse_number::<usize>(layer, KEY_ITEMS_PER_REVIEW)?.unwrap_or(DEFAULT_ITEMS_PER_REVIEW);
    let archive_days_threshold =
        parse_number::<u32>(layer, KEY_ARCHIVE_DAYS)?.unwrap_or(DEFAULT_ARCHIVE_DAYS_THRESHOLD);

    Ok(SchedulerConfig {
        items_per_review,
        archive_days_threshold,
    })
}

/// Lock timeout in milliseconds, if configured.
///
/// # Errors
///
/// Returns a config error if the value is not a valid number.
pub fn lock_timeout_from_layer(layer: &ConfigLayer) -> Result<Option<u64>> {
    parse_number::<u64>(layer, KEY_LOCK_TIMEOUT)
}

/// Determine if a key is startup-only (never stored in the DB layer).
fn is_startup_key(key: &str) -> bool {
    matches!(normalize_key(key).as_str(), "db" | "json" | KEY_LOCK_TIMEOUT)
}

/// Check a key/value pair destined for the DB config table.
///
/// Returns the normalized key.
///
/// # Errors
///
/// Returns a config error for unknown keys, startup-only keys (which the DB
/// layer never reads), or non-numeric values.
pub fn validate_db_setting(key: &str, value: &str) -> Result<String> {
    let key = normalize_key(key);
    if !is_known_key(&key) {
        return Err(VocabError::Config(format!("unknown config key '{key}'")));
    }
    if is_startup_key(&key) {
        return Err(VocabError::Config(format!(
            "'{key}' is read at startup; set it in .vocab/config.yaml or via the CLI"
        )));
    }
    // Same integer types the scheduler reads them as.
    match key.as_str() {
        KEY_ITEMS_PER_REVIEW => {
            parse_value::<usize>(&key, value)?;
        }
        KEY_ARCHIVE_DAYS => {
            parse_value::<u32>(&key, value)?;
        }
        _ => {
            parse_value::<u64>(&key, value)?;
        }
    }
    Ok(key)
}

/// Whether `key` is one the scheduler or CLI understands.
#[must_use]
pub fn is_known_key(key: &str) -> bool {
    matches!(
        normalize_key(key).as_str(),
        KEY_ITEMS_PER_REVIEW | KEY_ARCHIVE_DAYS | KEY_LOCK_TIMEOUT | "db" | "json"
    )
}

fn insert_key_value(layer: &mut ConfigLayer, key: &str, value: String) {
    let key = normalize_key(key);
    if is_startup_key(&key) {
        layer.startup.insert(key, value);
    } else {
        layer.runtime.insert(key, value);
    }
}

#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_number<T: std::str::FromStr>(layer: &ConfigLayer, key: &str) -> Result<Option<T>> {
    layer.get(key).map(|raw| parse_value(key, raw)).transpose()
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        VocabError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))
    })
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        insert_key_value(&mut layer, &key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
