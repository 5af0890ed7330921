//! Integration tests for the record store.

use chrono::Duration;
use guild_store::documents::{ActiveTickets, BlacklistDoc, ClosedTickets, OwnersDoc, TicketEntry};
use guild_store::{
    GuildConfig, RecordStore, SanctionInput, SanctionKind, StoreConfig, StoreEvent,
    SubscriptionFilter, UserProfile,
};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Route store logs to the test output; `RUST_LOG=guild_store=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_store(dir: &TempDir) -> RecordStore {
    init_tracing();
    RecordStore::open_and_bootstrap(StoreConfig {
        path: dir.path().join("store"),
        exclusive: false,
        ..Default::default()
    })
    .unwrap()
}

// --- Guild Config Workflow ---

#[test]
fn test_guild_setup_workflow() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    // A fresh guild reads as defaults without touching disk
    let cfg = store.get_guild("G1");
    assert_eq!(cfg.prefix, "!");
    assert_eq!(cfg.language, "en");
    assert!(!cfg.welcome.enabled);
    assert!(cfg.welcome.embed.enabled);
    assert!(store.list_guild_ids().unwrap().is_empty());

    // Enable welcome messages with a custom embed title
    let cfg = store
        .update_guild(
            "G1",
            json!({
                "welcome": {
                    "enabled": true,
                    "channel": "C9",
                    "embed": { "title": "Hi" }
                }
            }),
        )
        .unwrap();

    assert!(cfg.welcome.enabled);
    assert_eq!(cfg.welcome.channel.as_deref(), Some("C9"));
    assert_eq!(cfg.welcome.embed.title, "Hi");
    // Siblings of the merged keys keep their values
    assert!(cfg.welcome.embed.enabled);
    assert_eq!(cfg.welcome.message, "Welcome {user} to {server}!");
    assert!(cfg.created_at.is_some());
    assert_eq!(store.get_guild("G1"), cfg);
}

#[test]
fn test_update_replaces_arrays() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .update_guild("G1", json!({"ignoredChannels": ["a", "b", "c"]}))
        .unwrap();
    let cfg = store
        .update_guild("G1", json!({"ignoredChannels": ["d"]}))
        .unwrap();

    assert_eq!(cfg.ignored_channels, vec!["d"]);
}

#[test]
fn test_updated_at_advances_created_at_sticks() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let first = store.update_guild("G1", json!({"prefix": "?"})).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = store.update_guild("G1", json!({"prefix": "$"})).unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at > first.updated_at);
}

#[test]
fn test_unknown_fields_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .update_guild("G1", json!({"musicSettings": {"volume": 40}}))
        .unwrap();
    store.update_guild("G1", json!({"prefix": "?"})).unwrap();

    let raw = fs::read_to_string(store.path().join("guilds/G1.json")).unwrap();
    let on_disk: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["musicSettings"]["volume"], 40);
    assert_eq!(on_disk["prefix"], "?");
    assert_eq!(on_disk["guildId"], "G1");
}

#[test]
fn test_nested_unknown_keys_survive_update() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .update_guild(
            "G1",
            json!({"logs": {"joins": "C7"}, "moderation": {"autoMod": true}}),
        )
        .unwrap();
    let cfg = store
        .update_guild("G1", json!({"moderation": {"antiSpam": true}}))
        .unwrap();

    assert_eq!(cfg.logs.channel("joins"), Some("C7"));
    assert_eq!(cfg.logs.channel("moderation"), None);
    assert!(cfg.moderation.anti_spam);

    let raw = fs::read_to_string(store.path().join("guilds/G1.json")).unwrap();
    let on_disk: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk["logs"]["joins"], "C7");
    assert_eq!(on_disk["moderation"]["autoMod"], true);
    assert_eq!(on_disk["moderation"]["antiSpam"], true);
}

#[test]
fn test_set_guild_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut cfg = GuildConfig::new("G1");
    cfg.prefix = "?".into();
    cfg.logs.set("moderation", Some("C1".into()));
    cfg.ignored_channels = vec!["C2".into()];
    let stored = store.set_guild("G1", cfg).unwrap();

    assert_eq!(store.get_guild("G1"), stored);
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let warning_id;

    {
        let store = test_store(&dir);
        store.update_guild("G1", json!({"prefix": "?"})).unwrap();
        warning_id = store
            .add_warning(SanctionInput::new("U1", "M1", "spam").in_guild("G1"))
            .unwrap();
    }

    let store = test_store(&dir);
    assert_eq!(store.get_guild("G1").prefix, "?");
    assert_eq!(store.get_warnings("U1", Some("G1"))[0].id, warning_id);
}

// --- User Profiles ---

#[test]
fn test_user_profile_defaults_and_merge() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let profile = store.get_user("U1");
    assert_eq!(profile.leveling.level, 1);
    assert_eq!(profile.economy.coins, 0);
    assert!(profile.servers.is_empty());

    let profile = store
        .update_user("U1", json!({"economy": {"coins": 250}}))
        .unwrap();
    assert_eq!(profile.economy.coins, 250);
    assert_eq!(profile.economy.bank, 0);

    let profile = store
        .modify_user("U1", |p| p.economy.bank += 100)
        .unwrap();
    assert_eq!(profile.economy.coins, 250);
    assert_eq!(profile.economy.bank, 100);
}

#[test]
fn test_unknown_user_reads_identically() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let first = store.get_user("U404");
    assert_eq!(first.user_id, "U404");
    assert!(first.is_unsaved());
    assert_eq!(store.get_user("U404"), first);
    assert!(store.list_user_ids().unwrap().is_empty());
}

#[test]
fn test_profile_coins_and_servers_workflow() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut profile = UserProfile::new("42");
    profile.economy.coins = 100;
    profile.servers.insert("S1".into());
    store.set_user("42", profile).unwrap();

    store
        .update_user("42", json!({"economy": {"coins": 150}}))
        .unwrap();
    store
        .update_user("42", json!({"servers": ["S1", "S2"]}))
        .unwrap();

    let profile = store.get_user("42");
    assert_eq!(profile.economy.coins, 150);
    assert_eq!(
        profile.servers.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["S1", "S2"]
    );
    assert_eq!(profile.leveling.level, 1);
    assert!(profile.extra.is_empty());
}

#[test]
fn test_set_user_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut profile = UserProfile::new("U1");
    profile.username = Some("ferris".into());
    profile.servers.insert("G1".into());
    let stored = store.set_user("U1", profile).unwrap();

    assert_eq!(store.get_user("U1"), stored);
}

// --- Sanctions ---

#[test]
fn test_warning_lifecycle() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let w1 = store
        .add_warning(SanctionInput::new("U1", "M1", "spam").in_guild("G1"))
        .unwrap();
    let w2 = store
        .add_warning(SanctionInput::new("U1", "M1", "caps").in_guild("G1"))
        .unwrap();
    store
        .add_warning(SanctionInput::new("U1", "M2", "elsewhere").in_guild("G2"))
        .unwrap();

    assert!(w1.as_str().starts_with("warn_"));
    assert_ne!(w1, w2);

    // Insertion order, filtered by guild
    let warnings = store.get_warnings("U1", Some("G1"));
    assert_eq!(
        warnings.iter().map(|w| w.reason.as_str()).collect::<Vec<_>>(),
        vec!["spam", "caps"]
    );
    assert_eq!(store.warning_count("U1", None), 3);

    assert!(store.revoke_warning(&w1, "M3", "appealed").unwrap());
    assert!(!store.revoke_warning(&w1, "M3", "twice").unwrap());
    assert_eq!(store.warning_count("U1", Some("G1")), 1);

    // The revoked record stays on disk with its reversal metadata
    let log = store.load_document::<guild_store::documents::WarningsLog>();
    let revoked = log.warnings.iter().find(|w| w.id == w1).unwrap();
    assert!(revoked.removed);
    let reversal = revoked.reversal.as_ref().unwrap();
    assert_eq!(reversal.by, "M3");
    assert_eq!(reversal.reason, "appealed");
}

#[test]
fn test_clear_warnings_by_guild() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    for guild in ["G1", "G1", "G2"] {
        store
            .add_warning(SanctionInput::new("U1", "M1", "spam").in_guild(guild))
            .unwrap();
    }

    assert_eq!(store.clear_warnings("U1", Some("G1"), "M1", "reset").unwrap(), 2);
    assert_eq!(store.clear_warnings("U1", Some("G1"), "M1", "reset").unwrap(), 0);
    assert_eq!(store.warning_count("U1", None), 1);
}

#[test]
fn test_kicks_are_not_bans() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let kick = store
        .add_kick(SanctionInput::new("U1", "M1", "rude").in_guild("G1"))
        .unwrap();

    assert!(store.get_bans("U1").is_empty());
    let kicks = store.get_kicks("U1");
    assert_eq!(kicks.len(), 1);
    assert_eq!(kicks[0].id, kick);
    assert_eq!(kicks[0].kind, SanctionKind::Kick);
}

#[test]
fn test_ban_and_lift() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .add_ban(SanctionInput::new("U1", "M1", "raid").in_guild("G1"))
        .unwrap();
    store
        .add_ban(SanctionInput::new("U1", "M1", "raid").in_guild("G2"))
        .unwrap();

    assert_eq!(store.lift_ban("U1", "G1", "M2", "appeal").unwrap(), 1);

    let bans = store.get_bans("U1");
    assert_eq!(bans.len(), 2);
    assert!(bans.iter().any(|b| b.guild_id.as_deref() == Some("G1") && b.removed));
    assert!(bans.iter().any(|b| b.guild_id.as_deref() == Some("G2") && !b.removed));
}

#[test]
fn test_mute_expiry() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .add_mute(
            SanctionInput::new("U1", "M1", "flood")
                .in_guild("G1")
                .lasting(Duration::minutes(10)),
        )
        .unwrap();

    let mute = &store.get_mutes("U1")[0];
    let now = chrono::Utc::now();
    assert!(mute.is_active(now));
    assert!(!mute.is_active(now + Duration::minutes(11)));

    assert_eq!(store.lift_mute("U1", "G1", "M1", "early").unwrap(), 1);
    assert!(!store.get_mutes("U1")[0].is_active(now));
}

#[test]
fn test_global_ban_has_no_guild() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let id = store
        .add_global_ban(SanctionInput::new("U1", "OWNER", "scam").in_guild("G1"))
        .unwrap();

    assert!(id.as_str().starts_with("gban_"));
    assert_eq!(store.get_global_bans("U1")[0].guild_id, None);
    assert!(store.is_globally_banned("U1"));

    assert_eq!(store.lift_global_ban("U1", "OWNER", "appeal").unwrap(), 1);
    assert!(!store.is_globally_banned("U1"));
}

#[test]
fn test_sync_moderation_summary() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let w1 = store
        .add_warning(SanctionInput::new("U1", "M1", "a").in_guild("G1"))
        .unwrap();
    store
        .add_warning(SanctionInput::new("U1", "M1", "b").in_guild("G1"))
        .unwrap();
    store
        .add_kick(SanctionInput::new("U1", "M1", "c").in_guild("G1"))
        .unwrap();
    store.revoke_warning(&w1, "M1", "oops").unwrap();

    let profile = store.sync_moderation_summary("U1").unwrap();
    assert_eq!(profile.moderation.warnings, 1);
    assert_eq!(profile.moderation.warning_ids.len(), 2);
    assert_eq!(profile.moderation.kicks, 1);
    assert_eq!(profile.moderation.bans, 0);
    assert_eq!(store.get_user("U1").moderation, profile.moderation);
}

// --- Named Documents ---

#[test]
fn test_bootstrap_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut blacklist = BlacklistDoc {
        users: vec!["U666".into()],
        ..Default::default()
    };
    store.write_document(&mut blacklist).unwrap();
    store.bootstrap().unwrap();

    assert_eq!(store.load_document::<BlacklistDoc>().users, vec!["U666"]);
    assert!(store.is_blacklisted_user("U666"));
    assert!(!store.is_blacklisted_user("U1"));
}

#[test]
fn test_blacklist_flag_on_profile() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .update_user("U1", json!({"security": {"blacklisted": true}}))
        .unwrap();
    assert!(store.is_blacklisted_user("U1"));
}

#[test]
fn test_owner_audit_trail() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    store
        .record_owner_action("O1", "global_ban", Some("U1"))
        .unwrap();

    let owners = store.load_document::<OwnersDoc>();
    assert_eq!(owners.actions.len(), 1);
    assert_eq!(owners.actions[0].target.as_deref(), Some("U1"));
    assert!(owners.last_updated.is_some());
}

#[test]
fn test_close_ticket_moves_entry() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);

    let mut active = ActiveTickets {
        tickets: vec![TicketEntry {
            channel_id: "C1".into(),
            guild_id: "G1".into(),
            user_id: "U1".into(),
            subject: Some("billing".into()),
            opened_at: chrono::Utc::now(),
            closed: None,
        }],
        ..Default::default()
    };
    store.write_document(&mut active).unwrap();

    assert!(store.close_ticket("C1", "STAFF", "resolved").unwrap());
    assert!(!store.close_ticket("C1", "STAFF", "resolved").unwrap());

    assert!(store.load_document::<ActiveTickets>().tickets.is_empty());
    let closed = store.load_document::<ClosedTickets>();
    assert_eq!(closed.tickets.len(), 1);
    assert_eq!(closed.tickets[0].closed.as_ref().unwrap().by, "STAFF");
}

// --- Subscriptions ---

#[test]
fn test_events_follow_writes() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let handle = store.subscribe(SubscriptionFilter::all().in_guilds(vec!["G1".into()]));

    store.update_guild("G1", json!({"prefix": "?"})).unwrap();
    store.update_guild("G2", json!({"prefix": "?"})).unwrap();
    store.set_guild("G1", GuildConfig::default()).unwrap();
    store.delete_guild("G1").unwrap();

    let events = handle.drain();
    assert_eq!(
        events,
        vec![
            StoreEvent::GuildChanged { guild_id: "G1".into() },
            StoreEvent::GuildChanged { guild_id: "G1".into() },
            StoreEvent::GuildDeleted { guild_id: "G1".into() },
        ]
    );
}

#[test]
fn test_sanction_events() {
    let dir = TempDir::new().unwrap();
    let store = test_store(&dir);
    let handle = store.subscribe(SubscriptionFilter::sanctions());

    let id = store
        .add_warning(SanctionInput::new("U1", "M1", "spam").in_guild("G1"))
        .unwrap();
    store.revoke_warning(&id, "M1", "oops").unwrap();

    let events = handle.drain();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], StoreEvent::SanctionAdded { id: added, .. } if *added == id));
    assert!(matches!(
        &events[1],
        StoreEvent::SanctionReversed { kind: SanctionKind::Warning, .. }
    ));
}
