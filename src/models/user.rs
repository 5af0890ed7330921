//! Global (cross-guild) user profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::types::SanctionId;

/// Profile of one user, shared by every guild the bot sees them in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    /// Guilds the user is known to be in.
    pub servers: BTreeSet<String>,
    pub global_stats: GlobalStats,
    pub moderation: ModerationSummary,
    pub security: Security,
    pub economy: Economy,
    pub leveling: Leveling,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.updated_at.is_none()
    }

    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.created_at.get_or_insert(at);
        self.updated_at = Some(at);
    }

    /// Count one unit of activity. Counters only move forward.
    pub fn record_activity(
        &mut self,
        guild_id: Option<&str>,
        kind: ActivityKind,
        at: DateTime<Utc>,
    ) {
        match kind {
            ActivityKind::Message => {
                let stats = &mut self.global_stats;
                stats.messages_sent = stats.messages_sent.saturating_add(1);
                self.leveling.total_messages = self.leveling.total_messages.saturating_add(1);
            }
            ActivityKind::Command => {
                let stats = &mut self.global_stats;
                stats.commands_used = stats.commands_used.saturating_add(1);
            }
        }
        if let Some(guild_id) = guild_id {
            self.servers.insert(guild_id.to_string());
        }
        self.global_stats.first_seen.get_or_insert(at);
        self.global_stats.last_seen = Some(at);
    }
}

/// What kind of activity `record_activity` counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Message,
    Command,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalStats {
    pub messages_sent: u64,
    pub commands_used: u64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Denormalized copy of the user's sanction history.
///
/// The sanction collections are authoritative; this is rebuilt from them by
/// `RecordStore::sync_moderation_summary`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerationSummary {
    pub warnings: u32,
    pub bans: u32,
    pub mutes: u32,
    pub kicks: u32,
    pub warning_ids: Vec<SanctionId>,
    pub ban_ids: Vec<SanctionId>,
    pub mute_ids: Vec<SanctionId>,
    pub kick_ids: Vec<SanctionId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Security {
    pub blacklisted: bool,
    pub blacklist_reason: Option<String>,
    pub risk_score: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Economy {
    pub coins: u64,
    pub bank: u64,
    pub daily_streak: u32,
    pub last_daily: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Leveling {
    pub xp: u64,
    pub level: u32,
    pub total_messages: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Leveling {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            total_messages: 0,
            extra: Map::new(),
        }
    }
}
