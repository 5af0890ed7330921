//! Main RecordStore tying all components together.

use crate::config::StoreConfig;
use crate::documents::{
    ActiveTickets, BackupIndex, BansLog, BlacklistDoc, ChannelLock, ChannelLocks, ClosedTickets,
    GlobalBansLog, GlobalData, KicksLog, MutesLog, NamedDocument, OwnerAction, OwnersDoc,
    SanctionLog, WarningsLog,
};
use crate::error::{Result, StoreError};
use crate::json_file;
use crate::locks::KeyLocks;
use crate::merge::deep_merge;
use crate::models::{
    ActivityKind, GuildConfig, ModerationSummary, Reversal, SanctionInput, SanctionRecord,
    UserProfile,
};
use crate::subscriptions::{
    StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
use crate::types::{now, validate_key, SanctionId};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const GUILDS_DIR: &str = "guilds";
const USERS_DIR: &str = "users";

/// Directories created by `bootstrap`.
const DIRECTORIES: &[&str] = &[
    GUILDS_DIR,
    USERS_DIR,
    "sanctions",
    "tickets",
    "channels",
    "backups",
];

/// An entity kept as one JSON file per ID.
trait Entity: Serialize + DeserializeOwned {
    const DIR: &'static str;

    fn with_id(id: &str) -> Self;

    fn set_id(&mut self, id: &str);

    fn stamp(&mut self, at: DateTime<Utc>);

    fn changed(id: &str) -> StoreEvent;
}

impl Entity for GuildConfig {
    const DIR: &'static str = GUILDS_DIR;

    fn with_id(id: &str) -> Self {
        GuildConfig::new(id)
    }

    fn set_id(&mut self, id: &str) {
        self.guild_id = id.to_string();
    }

    fn stamp(&mut self, at: DateTime<Utc>) {
        GuildConfig::stamp(self, at)
    }

    fn changed(id: &str) -> StoreEvent {
        StoreEvent::GuildChanged {
            guild_id: id.to_string(),
        }
    }
}

impl Entity for UserProfile {
    const DIR: &'static str = USERS_DIR;

    fn with_id(id: &str) -> Self {
        UserProfile::new(id)
    }

    fn set_id(&mut self, id: &str) {
        self.user_id = id.to_string();
    }

    fn stamp(&mut self, at: DateTime<Utc>) {
        UserProfile::stamp(self, at)
    }

    fn changed(id: &str) -> StoreEvent {
        StoreEvent::UserChanged {
            user_id: id.to_string(),
        }
    }
}

/// The bot's record store.
///
/// Provides a unified interface for:
/// - Bootstrapping the directory tree and named documents
/// - Reading and writing named documents
/// - Loading, replacing and merging guild configs and user profiles
/// - Appending, querying and reversing sanctions
///
/// Reads never fail: missing or unreadable files yield defaults (logged).
/// Writes return `Result` and are logged on failure; nothing panics.
pub struct RecordStore {
    /// Store configuration.
    config: StoreConfig,

    /// Lock file for exclusive access.
    _lock_file: Option<File>,

    /// Per-file write locks.
    locks: KeyLocks,

    /// Change subscribers.
    events: SubscriptionManager,
}

impl RecordStore {
    /// Open a store rooted at `config.path`, creating the root if needed.
    ///
    /// Call [`RecordStore::bootstrap`] before first use.
    pub fn open(config: StoreConfig) -> Result<Self> {
        fs::create_dir_all(&config.path)?;

        let lock_file = if config.exclusive {
            Some(Self::acquire_lock(&config.path)?)
        } else {
            None
        };

        Ok(Self {
            config,
            _lock_file: lock_file,
            locks: KeyLocks::new(),
            events: SubscriptionManager::new(),
        })
    }

    /// Open and bootstrap in one step.
    pub fn open_and_bootstrap(config: StoreConfig) -> Result<Self> {
        let store = Self::open(config)?;
        store.bootstrap()?;
        Ok(store)
    }

    /// Ensure the directory tree and every named document exist.
    ///
    /// Idempotent: existing files are never rewritten, so data survives
    /// repeated calls.
    pub fn bootstrap(&self) -> Result<()> {
        for dir in DIRECTORIES {
            fs::create_dir_all(self.config.path.join(dir))?;
        }

        let mut created = 0;
        let owners = self.config.owners.clone();
        created += self.ensure_document(|| OwnersDoc {
            owners,
            ..Default::default()
        })? as usize;
        created += self.ensure_document(BlacklistDoc::default)? as usize;
        created += self.ensure_document(GlobalData::default)? as usize;
        created += self.ensure_document(WarningsLog::default)? as usize;
        created += self.ensure_document(BansLog::default)? as usize;
        created += self.ensure_document(MutesLog::default)? as usize;
        created += self.ensure_document(KicksLog::default)? as usize;
        created += self.ensure_document(GlobalBansLog::default)? as usize;
        created += self.ensure_document(ActiveTickets::default)? as usize;
        created += self.ensure_document(ClosedTickets::default)? as usize;
        created += self.ensure_document(ChannelLocks::default)? as usize;
        created += self.ensure_document(BackupIndex::default)? as usize;

        info!(path = %self.config.path.display(), created, "store bootstrapped");
        Ok(())
    }

    /// Write `init()` to `D::PATH` unless the file already exists.
    fn ensure_document<D: NamedDocument>(&self, init: impl FnOnce() -> D) -> Result<bool> {
        let path = self.document_path::<D>();
        let _guard = self.locks.lock(&path);

        if path.exists() {
            return Ok(false);
        }

        let mut doc = init();
        doc.touch(now());
        self.persist(&path, &doc)?;
        Ok(true)
    }

    // --- Named Documents ---

    /// Read a named document. `None` if it is missing or unreadable.
    pub fn read_document<D: NamedDocument>(&self) -> Option<D> {
        self.load_file(&self.document_path::<D>())
    }

    /// Read a named document, falling back to its default shape.
    pub fn load_document<D: NamedDocument>(&self) -> D {
        self.read_document().unwrap_or_default()
    }

    /// Overwrite a named document in full. Stamps `lastUpdated` on `doc`.
    pub fn write_document<D: NamedDocument>(&self, doc: &mut D) -> Result<()> {
        let path = self.document_path::<D>();
        let _guard = self.locks.lock(&path);

        self.store_document(&path, doc)
    }

    /// Read-modify-write a named document under its write lock.
    ///
    /// A missing document starts from the default shape. An unreadable one
    /// is an error: it is left on disk rather than replaced by a default.
    pub fn modify_document<D, R>(&self, f: impl FnOnce(&mut D) -> R) -> Result<R>
    where
        D: NamedDocument,
    {
        let path = self.document_path::<D>();
        let _guard = self.locks.lock(&path);

        let mut doc = self.load_for_write::<D>(&path)?;
        let out = f(&mut doc);
        self.store_document(&path, &mut doc)?;
        Ok(out)
    }

    /// Read a document that is about to be rewritten. Caller holds its lock.
    fn load_for_write<D: NamedDocument>(&self, path: &Path) -> Result<D> {
        let doc = json_file::read_json(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "refusing to rewrite unreadable document")
        })?;
        Ok(doc.unwrap_or_default())
    }

    /// Stamp, write and announce a document. Caller holds its lock.
    fn store_document<D: NamedDocument>(&self, path: &Path, doc: &mut D) -> Result<()> {
        doc.touch(now());
        self.persist(path, doc)?;
        self.events.broadcast(StoreEvent::DocumentWritten {
            path: D::PATH.to_string(),
        });
        Ok(())
    }

    fn document_path<D: NamedDocument>(&self) -> PathBuf {
        D::PATH
            .split('/')
            .fold(self.config.path.clone(), |acc, part| acc.join(part))
    }

    // --- Guild Operations ---

    /// Get a guild's config, or a fresh (unsaved) default if none is stored.
    pub fn get_guild(&self, guild_id: &str) -> GuildConfig {
        self.get_entity(guild_id)
    }

    /// Replace a guild's config in full.
    pub fn set_guild(&self, guild_id: &str, config: GuildConfig) -> Result<GuildConfig> {
        self.set_entity(guild_id, config)
    }

    /// Deep-merge `partial` onto the stored config and write the result.
    ///
    /// Nested objects merge; arrays and scalars in `partial` replace.
    pub fn update_guild(&self, guild_id: &str, partial: Value) -> Result<GuildConfig> {
        self.update_entity(guild_id, partial)
    }

    /// Typed read-modify-write of a guild config.
    pub fn modify_guild(
        &self,
        guild_id: &str,
        f: impl FnOnce(&mut GuildConfig),
    ) -> Result<GuildConfig> {
        self.modify_entity(guild_id, f)
    }

    /// Remove a guild's config. Returns whether a file was removed.
    pub fn delete_guild(&self, guild_id: &str) -> Result<bool> {
        validate_key(guild_id)?;
        let path = self.entity_path::<GuildConfig>(guild_id);
        let _guard = self.locks.lock(&path);

        let removed = json_file::remove(&path)
            .inspect_err(|e| warn!(guild_id, error = %e, "failed to delete guild"))?;
        if removed {
            debug!(guild_id, "guild deleted");
            self.events.broadcast(StoreEvent::GuildDeleted {
                guild_id: guild_id.to_string(),
            });
        }
        Ok(removed)
    }

    /// Whether a config file exists for the guild.
    pub fn guild_exists(&self, guild_id: &str) -> bool {
        validate_key(guild_id).is_ok() && self.entity_path::<GuildConfig>(guild_id).exists()
    }

    /// IDs of every stored guild, sorted.
    pub fn list_guild_ids(&self) -> Result<Vec<String>> {
        json_file::list_stems(&self.config.path.join(GUILDS_DIR))
    }

    // --- User Operations ---

    /// Get a user's profile, or a zeroed default if none is stored.
    pub fn get_user(&self, user_id: &str) -> UserProfile {
        self.get_entity(user_id)
    }

    pub fn set_user(&self, user_id: &str, profile: UserProfile) -> Result<UserProfile> {
        self.set_entity(user_id, profile)
    }

    pub fn update_user(&self, user_id: &str, partial: Value) -> Result<UserProfile> {
        self.update_entity(user_id, partial)
    }

    pub fn modify_user(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut UserProfile),
    ) -> Result<UserProfile> {
        self.modify_entity(user_id, f)
    }

    pub fn list_user_ids(&self) -> Result<Vec<String>> {
        json_file::list_stems(&self.config.path.join(USERS_DIR))
    }

    /// Count a message or command for the user and note the guild they used.
    pub fn record_activity(
        &self,
        user_id: &str,
        guild_id: Option<&str>,
        kind: ActivityKind,
    ) -> Result<UserProfile> {
        let at = now();
        self.modify_user(user_id, |profile| profile.record_activity(guild_id, kind, at))
    }

    // --- Entity Helpers ---

    fn entity_path<E: Entity>(&self, id: &str) -> PathBuf {
        self.config.path.join(E::DIR).join(format!("{id}.json"))
    }

    fn get_entity<E: Entity>(&self, id: &str) -> E {
        if let Err(e) = validate_key(id) {
            warn!(error = %e, "rejected entity id on read");
            return E::with_id(id);
        }

        match self.load_file::<E>(&self.entity_path::<E>(id)) {
            Some(mut entity) => {
                entity.set_id(id);
                entity
            }
            None => E::with_id(id),
        }
    }

    fn set_entity<E: Entity>(&self, id: &str, mut entity: E) -> Result<E> {
        validate_key(id)?;
        let path = self.entity_path::<E>(id);
        let _guard = self.locks.lock(&path);

        entity.set_id(id);
        entity.stamp(now());
        self.persist(&path, &entity)?;
        self.events.broadcast(E::changed(id));
        Ok(entity)
    }

    fn update_entity<E: Entity>(&self, id: &str, partial: Value) -> Result<E> {
        validate_key(id)?;
        let path = self.entity_path::<E>(id);
        let _guard = self.locks.lock(&path);

        let current = self.load_file::<E>(&path).unwrap_or_else(|| E::with_id(id));
        let mut merged = serde_json::to_value(&current)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        deep_merge(&mut merged, partial);

        let mut entity: E = serde_json::from_value(merged).map_err(|e| {
            warn!(id, dir = E::DIR, error = %e, "partial update does not fit entity shape");
            StoreError::Deserialization(e.to_string())
        })?;
        entity.set_id(id);
        entity.stamp(now());
        self.persist(&path, &entity)?;
        self.events.broadcast(E::changed(id));
        Ok(entity)
    }

    fn modify_entity<E: Entity>(&self, id: &str, f: impl FnOnce(&mut E)) -> Result<E> {
        validate_key(id)?;
        let path = self.entity_path::<E>(id);
        let _guard = self.locks.lock(&path);

        let mut entity = self.load_file::<E>(&path).unwrap_or_else(|| E::with_id(id));
        f(&mut entity);
        entity.set_id(id);
        entity.stamp(now());
        self.persist(&path, &entity)?;
        self.events.broadcast(E::changed(id));
        Ok(entity)
    }

    // --- Sanction Operations ---

    /// Append a warning. Returns the new warning's ID.
    pub fn add_warning(&self, input: SanctionInput) -> Result<SanctionId> {
        self.append_sanction::<WarningsLog>(input)
    }

    pub fn add_ban(&self, input: SanctionInput) -> Result<SanctionId> {
        self.append_sanction::<BansLog>(input)
    }

    pub fn add_mute(&self, input: SanctionInput) -> Result<SanctionId> {
        self.append_sanction::<MutesLog>(input)
    }

    pub fn add_kick(&self, input: SanctionInput) -> Result<SanctionId> {
        self.append_sanction::<KicksLog>(input)
    }

    /// Ban across every guild. Any guild on `input` is dropped.
    pub fn add_global_ban(&self, input: SanctionInput) -> Result<SanctionId> {
        self.append_sanction::<GlobalBansLog>(input)
    }

    /// Non-removed warnings for a user, optionally limited to one guild, in insertion order.
    pub fn get_warnings(&self, user_id: &str, guild_id: Option<&str>) -> Vec<SanctionRecord> {
        self.load_document::<WarningsLog>()
            .warnings
            .into_iter()
            .filter(|w| !w.removed && w.user_id == user_id)
            .filter(|w| guild_id.map_or(true, |g| w.guild_id.as_deref() == Some(g)))
            .collect()
    }

    /// Number of non-removed warnings.
    pub fn warning_count(&self, user_id: &str, guild_id: Option<&str>) -> usize {
        self.get_warnings(user_id, guild_id).len()
    }

    /// Every ban record for a user, lifted or not.
    pub fn get_bans(&self, user_id: &str) -> Vec<SanctionRecord> {
        Self::records_for(self.load_document::<BansLog>(), user_id)
    }

    /// Every mute record for a user, lifted or not.
    pub fn get_mutes(&self, user_id: &str) -> Vec<SanctionRecord> {
        Self::records_for(self.load_document::<MutesLog>(), user_id)
    }

    pub fn get_kicks(&self, user_id: &str) -> Vec<SanctionRecord> {
        Self::records_for(self.load_document::<KicksLog>(), user_id)
    }

    pub fn get_global_bans(&self, user_id: &str) -> Vec<SanctionRecord> {
        Self::records_for(self.load_document::<GlobalBansLog>(), user_id)
    }

    /// Whether the user has an active global ban.
    pub fn is_globally_banned(&self, user_id: &str) -> bool {
        let at = now();
        self.get_global_bans(user_id).iter().any(|b| b.is_active(at))
    }

    /// Flag a warning as removed. Returns false if no such active warning exists.
    pub fn revoke_warning(&self, id: &SanctionId, by: &str, reason: &str) -> Result<bool> {
        let reversed =
            self.reverse_where::<WarningsLog>(|w| &w.id == id, Reversal::new(by, reason, now()))?;
        Ok(!reversed.is_empty())
    }

    /// Remove every active warning for a user (in one guild, or everywhere).
    pub fn clear_warnings(
        &self,
        user_id: &str,
        guild_id: Option<&str>,
        by: &str,
        reason: &str,
    ) -> Result<usize> {
        let reversed = self.reverse_where::<WarningsLog>(
            |w| w.user_id == user_id && guild_id.map_or(true, |g| w.guild_id.as_deref() == Some(g)),
            Reversal::new(by, reason, now()),
        )?;
        Ok(reversed.len())
    }

    /// Lift the user's active bans in a guild. Returns how many were lifted.
    pub fn lift_ban(
        &self,
        user_id: &str,
        guild_id: &str,
        by: &str,
        reason: &str,
    ) -> Result<usize> {
        let reversed = self.reverse_where::<BansLog>(
            |b| b.user_id == user_id && b.guild_id.as_deref() == Some(guild_id),
            Reversal::new(by, reason, now()),
        )?;
        Ok(reversed.len())
    }

    /// Lift the user's active mutes in a guild.
    pub fn lift_mute(
        &self,
        user_id: &str,
        guild_id: &str,
        by: &str,
        reason: &str,
    ) -> Result<usize> {
        let reversed = self.reverse_where::<MutesLog>(
            |m| m.user_id == user_id && m.guild_id.as_deref() == Some(guild_id),
            Reversal::new(by, reason, now()),
        )?;
        Ok(reversed.len())
    }

    pub fn lift_global_ban(&self, user_id: &str, by: &str, reason: &str) -> Result<usize> {
        let reversed = self.reverse_where::<GlobalBansLog>(
            |b| b.user_id == user_id,
            Reversal::new(by, reason, now()),
        )?;
        Ok(reversed.len())
    }

    /// Rebuild the moderation summary embedded in a user's profile from the
    /// sanction collections.
    ///
    /// Appending a sanction and updating the profile are separate writes;
    /// this is how the two are brought back in line.
    pub fn sync_moderation_summary(&self, user_id: &str) -> Result<UserProfile> {
        let warnings = Self::records_for(self.load_document::<WarningsLog>(), user_id);
        let bans = self.get_bans(user_id);
        let mutes = self.get_mutes(user_id);
        let kicks = self.get_kicks(user_id);

        let ids = |records: &[SanctionRecord]| -> Vec<SanctionId> {
            records.iter().map(|r| r.id.clone()).collect()
        };
        // Saturates rather than wrapping.
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let summary = ModerationSummary {
            warnings: count(warnings.iter().filter(|w| !w.removed).count()),
            bans: count(bans.len()),
            mutes: count(mutes.len()),
            kicks: count(kicks.len()),
            warning_ids: ids(&warnings),
            ban_ids: ids(&bans),
            mute_ids: ids(&mutes),
            kick_ids: ids(&kicks),
            extra: Default::default(),
        };

        self.modify_user(user_id, |profile| {
            let extra = std::mem::take(&mut profile.moderation.extra);
            profile.moderation = ModerationSummary { extra, ..summary };
        })
    }

    fn append_sanction<L: SanctionLog>(&self, input: SanctionInput) -> Result<SanctionId> {
        validate_key(&input.user_id)?;
        let at = now();

        let record = self.modify_document::<L, _>(|log| {
            let mut id = SanctionId::generate(L::KIND, at);
            while log.records().iter().any(|r| r.id == id) {
                id = SanctionId::generate(L::KIND, at);
            }
            let record = SanctionRecord::from_input(id, L::KIND, input, at);
            log.records_mut().push(record.clone());
            record
        })?;

        debug!(id = %record.id, kind = %L::KIND, user_id = %record.user_id, "sanction added");
        self.events.broadcast(StoreEvent::SanctionAdded {
            id: record.id.clone(),
            kind: L::KIND,
            user_id: record.user_id.clone(),
            guild_id: record.guild_id.clone(),
        });
        Ok(record.id)
    }

    /// Reverse every not-yet-removed record matching `pred`.
    fn reverse_where<L: SanctionLog>(
        &self,
        pred: impl Fn(&SanctionRecord) -> bool,
        reversal: Reversal,
    ) -> Result<Vec<SanctionRecord>> {
        let path = self.document_path::<L>();
        let _guard = self.locks.lock(&path);

        let mut log = self.load_for_write::<L>(&path)?;
        let reversed: Vec<SanctionRecord> = log
            .records_mut()
            .iter_mut()
            .filter(|r| !r.removed && pred(r))
            .filter_map(|r| r.reverse(reversal.clone()).then(|| r.clone()))
            .collect();

        // Nothing matched: leave the file alone.
        if reversed.is_empty() {
            return Ok(reversed);
        }
        self.store_document(&path, &mut log)?;

        for record in &reversed {
            self.events.broadcast(StoreEvent::SanctionReversed {
                id: record.id.clone(),
                kind: L::KIND,
                user_id: record.user_id.clone(),
                guild_id: record.guild_id.clone(),
            });
        }
        Ok(reversed)
    }

    fn records_for<L: SanctionLog>(log: L, user_id: &str) -> Vec<SanctionRecord> {
        log.records()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    // --- Bot-wide Documents ---

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.load_document::<OwnersDoc>()
            .owners
            .iter()
            .any(|o| o == user_id)
    }

    /// Append to the owners' audit trail.
    pub fn record_owner_action(
        &self,
        owner_id: &str,
        action: &str,
        target: Option<&str>,
    ) -> Result<()> {
        let entry = OwnerAction {
            owner_id: owner_id.to_string(),
            action: action.to_string(),
            target: target.map(str::to_string),
            at: now(),
        };
        self.modify_document::<OwnersDoc, _>(|doc| doc.actions.push(entry))
    }

    /// Blacklisted either in `blacklist.json` or on the user's profile.
    pub fn is_blacklisted_user(&self, user_id: &str) -> bool {
        self.load_document::<BlacklistDoc>()
            .users
            .iter()
            .any(|u| u == user_id)
            || self.get_user(user_id).security.blacklisted
    }

    pub fn is_blacklisted_guild(&self, guild_id: &str) -> bool {
        self.load_document::<BlacklistDoc>()
            .guilds
            .iter()
            .any(|g| g == guild_id)
    }

    /// Increment a global counter. Returns the new value.
    pub fn bump_statistic(&self, counter: &str, by: u64) -> Result<u64> {
        self.modify_document::<GlobalData, _>(|data| data.bump(counter, by))
    }

    // --- Tickets & Channel Locks ---

    /// Move a ticket from the active index to the closed index.
    ///
    /// The active index stays locked for the whole move, so concurrent closes
    /// of one ticket succeed exactly once. The closed index is written first:
    /// an interrupted close leaves the ticket listed in both rather than in
    /// neither.
    pub fn close_ticket(&self, channel_id: &str, by: &str, reason: &str) -> Result<bool> {
        let active_path = self.document_path::<ActiveTickets>();
        let _guard = self.locks.lock(&active_path);

        let mut active = self.load_for_write::<ActiveTickets>(&active_path)?;
        let Some(pos) = active.tickets.iter().position(|t| t.channel_id == channel_id) else {
            return Ok(false);
        };

        let mut ticket = active.tickets.remove(pos);
        ticket.closed = Some(Reversal::new(by, reason, now()));
        self.modify_document::<ClosedTickets, _>(|closed| closed.tickets.push(ticket))?;
        self.store_document(&active_path, &mut active)?;
        Ok(true)
    }

    /// Record a channel lock. Returns false if the channel is already locked.
    pub fn lock_channel(
        &self,
        guild_id: &str,
        channel_id: &str,
        by: &str,
        reason: &str,
    ) -> Result<bool> {
        let at = now();
        self.modify_document::<ChannelLocks, _>(|locks| {
            if locks.active(channel_id).is_some() {
                return false;
            }
            locks.locks.push(ChannelLock {
                channel_id: channel_id.to_string(),
                guild_id: guild_id.to_string(),
                locked_by: by.to_string(),
                reason: reason.to_string(),
                locked_at: at,
                removed: false,
                reversal: None,
            });
            true
        })
    }

    /// Release a channel lock. Returns false if the channel was not locked.
    pub fn unlock_channel(&self, channel_id: &str, by: &str, reason: &str) -> Result<bool> {
        let reversal = Reversal::new(by, reason, now());
        self.modify_document::<ChannelLocks, _>(|locks| {
            let mut released = false;
            for lock in locks
                .locks
                .iter_mut()
                .filter(|l| l.channel_id == channel_id && !l.removed)
            {
                lock.removed = true;
                lock.reversal = Some(reversal.clone());
                released = true;
            }
            released
        })
    }

    // --- Store Operations ---

    /// Subscribe to change events.
    pub fn subscribe(&self, filter: SubscriptionFilter) -> SubscriptionHandle {
        self.events.subscribe(SubscriptionConfig {
            buffer_size: self.config.event_buffer,
            filter,
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id)
    }

    /// Get the store path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    // --- Private Helpers ---

    /// Read a JSON file, logging and swallowing any failure.
    fn load_file<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        match json_file::read_json(path) {
            Ok(value) => {
                debug!(path = %path.display(), found = value.is_some(), "read");
                value
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable file, using defaults");
                None
            }
        }
    }

    fn persist<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        json_file::write_json(path, value)
            .inspect(|_| debug!(path = %path.display(), "written"))
            .inspect_err(|e| warn!(path = %path.display(), error = %e, "write failed"))
    }

    fn acquire_lock(path: &Path) -> Result<File> {
        let lock_path = path.join("LOCK");
        let lock_file = File::create(lock_path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| StoreError::Locked)?;

        Ok(lock_file)
    }
}
