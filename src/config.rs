//! Store configuration.

use crate::error::{Result, StoreError};
use std::env;
use std::path::PathBuf;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Base path for the store.
    pub path: PathBuf,

    /// Hold an exclusive lock on the base directory for the lifetime of the store.
    pub exclusive: bool,

    /// Owner IDs written to `owners.json` when bootstrap creates it.
    pub owners: Vec<String>,

    /// Buffered events per subscriber before it is dropped.
    pub event_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
            exclusive: true,
            owners: Vec::new(),
            event_buffer: 1000,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Load from the environment, reading `.env` first if present.
    ///
    /// - `BOT_DATA_DIR`: base path
    /// - `BOT_OWNERS`: JSON array of owner user IDs
    /// - `BOT_STORE_EXCLUSIVE`: `true`/`false`
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "failed to load .env file");
            }
        }

        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = var("BOT_DATA_DIR").filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path);
        }

        if let Some(raw) = var("BOT_OWNERS") {
            config.owners = parse_owner_list(&raw)?;
        }

        if let Some(raw) = var("BOT_STORE_EXCLUSIVE") {
            config.exclusive = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(StoreError::Config(format!(
                        "BOT_STORE_EXCLUSIVE must be true or false, got {other:?}"
                    )))
                }
            };
        }

        Ok(config)
    }
}

/// Parse `BOT_OWNERS`, a JSON array of user IDs. Blank input means no owners.
pub fn parse_owner_list(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let owners: Vec<String> = serde_json::from_str(raw).map_err(|e| {
        StoreError::Config(format!("BOT_OWNERS is not a JSON array of strings: {e}"))
    })?;

    let mut unique = Vec::with_capacity(owners.len());
    for owner in owners.into_iter().map(|o| o.trim().to_string()) {
        if !owner.is_empty() && !unique.contains(&owner) {
            unique.push(owner);
        }
    }
    Ok(unique)
}
