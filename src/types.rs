//! Core types shared across the store.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StoreError};

/// Length of the random base-36 suffix on sanction IDs.
const ID_SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Kind of moderation sanction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionKind {
    Warning,
    Ban,
    Mute,
    Kick,
    GlobalBan,
}

impl SanctionKind {
    /// Prefix used for generated IDs.
    pub fn id_prefix(self) -> &'static str {
        match self {
            SanctionKind::Warning => "warn",
            SanctionKind::Ban => "ban",
            SanctionKind::Mute => "mute",
            SanctionKind::Kick => "kick",
            SanctionKind::GlobalBan => "gban",
        }
    }

    /// Whether the sanction applies across every guild.
    pub fn is_global(self) -> bool {
        matches!(self, SanctionKind::GlobalBan)
    }
}

impl fmt::Display for SanctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SanctionKind::Warning => "warning",
            SanctionKind::Ban => "ban",
            SanctionKind::Mute => "mute",
            SanctionKind::Kick => "kick",
            SanctionKind::GlobalBan => "global ban",
        };
        f.write_str(name)
    }
}

/// Identifier of a sanction record: `{kind}_{unixMillis}_{suffix}`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanctionId(pub String);

impl SanctionId {
    /// Generate a fresh ID for `kind` at `at`.
    pub fn generate(kind: SanctionKind, at: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        SanctionId(format!(
            "{}_{}_{}",
            kind.id_prefix(),
            at.timestamp_millis(),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SanctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanctionId({})", self.0)
    }
}

impl fmt::Display for SanctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SanctionId {
    fn from(s: &str) -> Self {
        SanctionId(s.to_string())
    }
}

/// Current wall-clock time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Validate an entity key (guild or user ID) before it becomes a file name.
pub fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if bad {
        return Err(StoreError::InvalidId(key.to_string()));
    }
    Ok(())
}
