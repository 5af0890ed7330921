//! Sanction records: warnings, bans, mutes, kicks and global bans.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SanctionId, SanctionKind};

/// A single entry in one of the sanction collections.
///
/// Records are never deleted. Reversing one (unban, unmute, removing a
/// warning) sets `removed` and fills `reversal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanctionRecord {
    pub id: SanctionId,
    pub kind: SanctionKind,
    pub user_id: String,
    /// `None` for global sanctions.
    #[serde(default)]
    pub guild_id: Option<String>,
    pub moderator_id: String,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal: Option<Reversal>,
}

impl SanctionRecord {
    /// Build a record from caller input.
    pub(crate) fn from_input(
        id: SanctionId,
        kind: SanctionKind,
        input: SanctionInput,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            user_id: input.user_id,
            guild_id: if kind.is_global() { None } else { input.guild_id },
            moderator_id: input.moderator_id,
            reason: input.reason,
            created_at: at,
            expires_at: input.expires_at,
            removed: false,
            reversal: None,
        }
    }

    /// Not reversed and not past its expiry.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.removed && self.expires_at.map_or(true, |at| at > now)
    }

    /// Flag the record as reversed. Returns false if it already was.
    pub(crate) fn reverse(&mut self, reversal: Reversal) -> bool {
        if self.removed {
            return false;
        }
        self.removed = true;
        self.reversal = Some(reversal);
        true
    }
}

/// Who reversed a sanction, when, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reversal {
    pub by: String,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub reason: String,
}

impl Reversal {
    pub fn new(by: impl Into<String>, reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            by: by.into(),
            at,
            reason: reason.into(),
        }
    }
}

/// Input for a new sanction (before id and timestamp are assigned).
#[derive(Clone, Debug)]
pub struct SanctionInput {
    pub user_id: String,
    pub guild_id: Option<String>,
    pub moderator_id: String,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SanctionInput {
    pub fn new(
        user_id: impl Into<String>,
        moderator_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            guild_id: None,
            moderator_id: moderator_id.into(),
            reason: reason.into(),
            expires_at: None,
        }
    }

    /// Scope the sanction to a guild.
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Expire `duration` after now.
    pub fn lasting(self, duration: Duration) -> Self {
        self.expiring_at(Utc::now() + duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(expires_at: Option<DateTime<Utc>>) -> SanctionRecord {
        let input = SanctionInput::new("U1", "M1", "spam").in_guild("G1");
        let input = SanctionInput { expires_at, ..input };
        let id = SanctionId::from("mute_1_a");
        SanctionRecord::from_input(id, SanctionKind::Mute, input, Utc::now())
    }

    #[test]
    fn test_expiry_controls_activity() {
        let now = Utc::now();
        assert!(record(None).is_active(now));
        assert!(record(Some(now + Duration::minutes(5))).is_active(now));
        assert!(!record(Some(now - Duration::minutes(5))).is_active(now));
    }

    #[test]
    fn test_reverse_only_once() {
        let mut rec = record(None);
        let now = Utc::now();

        assert!(rec.reverse(Reversal::new("M2", "appeal", now)));
        assert!(!rec.reverse(Reversal::new("M3", "again", now)));
        assert_eq!(rec.reversal.as_ref().unwrap().by, "M2");
        assert!(!rec.is_active(now));
    }

    #[test]
    fn test_global_sanction_drops_guild() {
        let input = SanctionInput::new("U1", "O1", "raid").in_guild("G1");
        let rec = SanctionRecord::from_input(
            SanctionId::from("gban_1_a"),
            SanctionKind::GlobalBan,
            input,
            Utc::now(),
        );
        assert_eq!(rec.guild_id, None);
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(record(None)).unwrap();
        assert_eq!(value["userId"], "U1");
        assert_eq!(value["guildId"], "G1");
        assert_eq!(value["kind"], "mute");
        assert_eq!(value["removed"], json!(false));
        assert!(value.get("reversal").is_none());
    }
}
