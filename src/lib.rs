//! # Guild Store
//!
//! File-backed persistence for a Discord moderation bot: guild configs,
//! user profiles, sanction logs and a fixed set of bot-wide documents, all
//! stored as human-readable JSON under one base directory.
//!
//! ## Core Concepts
//!
//! - **Entities**: one file per guild (`guilds/<id>.json`) and per user
//!   (`users/<id>.json`), with defaults for anything missing
//! - **Partial updates**: deep merge of a JSON patch onto the stored entity
//! - **Sanctions**: append-only logs of warnings, bans, mutes, kicks and
//!   global bans; reversal flags a record instead of deleting it
//! - **Named documents**: typed documents at fixed paths (owners, blacklist,
//!   statistics, tickets, channel locks, backups)
//!
//! ## Example
//!
//! ```ignore
//! use guild_store::{RecordStore, StoreConfig, models::SanctionInput};
//! use serde_json::json;
//!
//! let store = RecordStore::open_and_bootstrap(StoreConfig::from_env()?)?;
//!
//! store.update_guild("123", json!({ "logs": { "moderation": "456" } }))?;
//!
//! let id = store.add_warning(SanctionInput::new("789", "42", "spam").in_guild("123"))?;
//! assert_eq!(store.warning_count("789", Some("123")), 1);
//! store.revoke_warning(&id, "42", "appealed")?;
//! ```

pub mod config;
pub mod cooldown;
pub mod documents;
pub mod error;
pub mod json_file;
pub mod locks;
pub mod merge;
pub mod models;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use config::StoreConfig;
pub use cooldown::CooldownTracker;
pub use documents::{NamedDocument, SanctionLog};
pub use error::{Result, StoreError};
pub use merge::deep_merge;
pub use models::{
    ActivityKind, GuildConfig, Reversal, SanctionInput, SanctionRecord, UserProfile,
};
pub use store::RecordStore;
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use types::{SanctionId, SanctionKind};
