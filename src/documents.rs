//! Named documents.
//!
//! Data that does not fit the one-file-per-entity pattern lives in a fixed
//! set of named documents (owners, blacklist, sanction logs, ...). Each kind
//! is a type implementing [`NamedDocument`], which ties it to exactly one
//! path under the store root and gives it a default shape. There is no way
//! to address a document by an arbitrary string.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Reversal, SanctionRecord};
use crate::types::SanctionKind;

/// A document stored at a fixed path relative to the store root.
pub trait NamedDocument: Serialize + DeserializeOwned + Default {
    /// Path relative to the store root, `/`-separated.
    const PATH: &'static str;

    /// Record the time of the write.
    fn touch(&mut self, at: DateTime<Utc>);
}

/// A named document holding one sanction collection.
pub trait SanctionLog: NamedDocument {
    const KIND: SanctionKind;

    fn records(&self) -> &[SanctionRecord];

    fn records_mut(&mut self) -> &mut Vec<SanctionRecord>;
}

macro_rules! named_document {
    ($ty:ty, $path:expr) => {
        impl NamedDocument for $ty {
            const PATH: &'static str = $path;

            fn touch(&mut self, at: DateTime<Utc>) {
                self.last_updated = Some(at);
            }
        }
    };
}

macro_rules! sanction_log {
    ($(#[$meta:meta])* $name:ident, $field:ident, $kind:expr, $path:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            pub $field: Vec<SanctionRecord>,
            pub last_updated: Option<DateTime<Utc>>,
        }

        named_document!($name, $path);

        impl SanctionLog for $name {
            const KIND: SanctionKind = $kind;

            fn records(&self) -> &[SanctionRecord] {
                &self.$field
            }

            fn records_mut(&mut self) -> &mut Vec<SanctionRecord> {
                &mut self.$field
            }
        }
    };
}

sanction_log!(
    /// `sanctions/warnings.json`
    WarningsLog, warnings, SanctionKind::Warning, "sanctions/warnings.json"
);
sanction_log!(
    /// `sanctions/bans.json`
    BansLog, bans, SanctionKind::Ban, "sanctions/bans.json"
);
sanction_log!(
    /// `sanctions/mutes.json`
    MutesLog, mutes, SanctionKind::Mute, "sanctions/mutes.json"
);
sanction_log!(
    /// `sanctions/kicks.json`. Kicks are kept apart from bans.
    KicksLog, kicks, SanctionKind::Kick, "sanctions/kicks.json"
);
sanction_log!(
    /// `sanctions/global_bans.json`
    GlobalBansLog, bans, SanctionKind::GlobalBan, "sanctions/global_bans.json"
);

/// Bot-wide owners and an audit trail of their actions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnersDoc {
    pub owners: Vec<String>,
    pub actions: Vec<OwnerAction>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(OwnersDoc, "owners.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAction {
    pub owner_id: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlacklistDoc {
    pub users: Vec<String>,
    pub guilds: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(BlacklistDoc, "blacklist.json");

/// Bot metadata and global counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalData {
    pub bot: BotInfo,
    /// Named monotonically increasing counters (`commandsExecuted`, ...).
    pub statistics: BTreeMap<String, u64>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(GlobalData, "globaldata.json");

impl GlobalData {
    pub fn bump(&mut self, counter: &str, by: u64) -> u64 {
        let value = self.statistics.entry(counter.to_string()).or_insert(0);
        *value = value.saturating_add(by);
        *value
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotInfo {
    pub version: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// One support ticket, as indexed by the ticket subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketEntry {
    pub channel_id: String,
    pub guild_id: String,
    pub user_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub opened_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<Reversal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveTickets {
    pub tickets: Vec<TicketEntry>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(ActiveTickets, "tickets/active.json");

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClosedTickets {
    pub tickets: Vec<TicketEntry>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(ClosedTickets, "tickets/closed.json");

/// A locked channel. Unlocking flags the entry instead of deleting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelLock {
    pub channel_id: String,
    pub guild_id: String,
    pub locked_by: String,
    #[serde(default)]
    pub reason: String,
    pub locked_at: DateTime<Utc>,
    #[serde(default)]
    pub removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reversal: Option<Reversal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelLocks {
    pub locks: Vec<ChannelLock>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(ChannelLocks, "channels/locks.json");

impl ChannelLocks {
    /// The current (not yet unlocked) lock on `channel_id`.
    pub fn active(&self, channel_id: &str) -> Option<&ChannelLock> {
        self.locks
            .iter()
            .rev()
            .find(|l| l.channel_id == channel_id && !l.removed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub name: String,
    pub guild_id: String,
    /// File name under `backups/`.
    pub file: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupIndex {
    pub backups: Vec<BackupEntry>,
    pub last_updated: Option<DateTime<Utc>>,
}

named_document!(BackupIndex, "backups/list.json");
