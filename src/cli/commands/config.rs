//! Config command implementation.

use super::Workspace;
use crate::cli::ConfigCommands;
use crate::config::{self, CliOverrides};
use crate::error::{Result, VocabError};
use std::collections::BTreeMap;
use tracing::info;

/// Execute a config subcommand.
///
/// # Errors
///
/// Returns a config error for unknown or invalid keys, or a store error.
pub fn execute(command: &ConfigCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let mut ws = Workspace::open(cli)?;

    match command {
        ConfigCommands::List => {
            let merged: BTreeMap<&String, &String> = ws
                .layer
                .startup
                .iter()
                .chain(ws.layer.runtime.iter())
                .collect();
            if json {
                super::print_json(&merged)?;
            } else {
                for (key, value) in merged {
                    println!("{key} = {value}");
                }
            }
        }
        ConfigCommands::Get { key } => {
            let key = config::normalize_key(key);
            let value = ws
                .layer
                .get(&key)
                .ok_or_else(|| VocabError::Config(format!("'{key}' is not set")))?;
            if json {
                super::print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{value}");
            }
        }
        ConfigCommands::Set { key, value } => {
            let key = config::validate_db_setting(key, value)?;
            let value = value.trim();
            ws.storage.set_config(&key, value)?;
            info!(key = %key, value, "Stored config value");
            if json {
                super::print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("Set {key} = {value}");
            }
        }
    }
    Ok(())
}
