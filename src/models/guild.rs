//! Per-guild configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default embed color (Discord blurple).
pub const DEFAULT_EMBED_COLOR: &str = "#5865F2";

/// Configuration of one guild.
///
/// Every field has a default, so documents written by older versions (or
/// with fields missing) always load into the full shape. Unknown fields are
/// kept in `extra` and written back untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildConfig {
    pub guild_id: String,
    pub language: String,
    pub prefix: String,
    pub timezone: String,
    pub logs: LogChannels,
    pub welcome: WelcomeConfig,
    pub tickets: TicketConfig,
    pub moderation: ModerationToggles,
    pub customization: Customization,
    pub ignored_channels: Vec<String>,
    /// Set on the first persisted write.
    pub created_at: Option<DateTime<Utc>>,
    /// Refreshed on every persisted write.
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GuildConfig {
    /// Default configuration for `guild_id`.
    pub fn new(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            ..Default::default()
        }
    }

    /// Whether this config has never been written to disk.
    pub fn is_unsaved(&self) -> bool {
        self.updated_at.is_none()
    }

    /// Stamp the write timestamps.
    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.created_at.get_or_insert(at);
        self.updated_at = Some(at);
    }
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            guild_id: String::new(),
            language: "en".to_string(),
            prefix: "!".to_string(),
            timezone: "UTC".to_string(),
            logs: LogChannels::default(),
            welcome: WelcomeConfig::default(),
            tickets: TicketConfig::default(),
            moderation: ModerationToggles::default(),
            customization: Customization::default(),
            ignored_channels: Vec::new(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }
}

/// Categories every guild starts with, all unset.
pub const DEFAULT_LOG_CATEGORIES: &[&str] =
    &["members", "messages", "moderation", "server", "tickets", "voice"];

/// Log category → channel. `None` means the category is not logged.
///
/// Open-ended: categories beyond the defaults are stored like any other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LogChannels(BTreeMap<String, Option<String>>);

impl LogChannels {
    /// Channel that receives `category` logs, if any.
    pub fn channel(&self, category: &str) -> Option<&str> {
        self.0.get(category).and_then(|c| c.as_deref())
    }

    pub fn set(&mut self, category: impl Into<String>, channel: Option<String>) {
        self.0.insert(category.into(), channel);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl Default for LogChannels {
    fn default() -> Self {
        Self(
            DEFAULT_LOG_CATEGORIES
                .iter()
                .map(|c| (c.to_string(), None))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for LogChannels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut logs = LogChannels::default();
        logs.0
            .extend(BTreeMap::<String, Option<String>>::deserialize(deserializer)?);
        Ok(logs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeConfig {
    pub enabled: bool,
    pub channel: Option<String>,
    /// Template; `{user}`, `{server}` and `{memberCount}` are substituted by the caller.
    pub message: String,
    pub embed: WelcomeEmbed,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: None,
            message: "Welcome {user} to {server}!".to_string(),
            embed: WelcomeEmbed::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeEmbed {
    pub enabled: bool,
    pub color: String,
    pub title: String,
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WelcomeEmbed {
    fn default() -> Self {
        Self {
            enabled: true,
            color: DEFAULT_EMBED_COLOR.to_string(),
            title: "Welcome!".to_string(),
            image: None,
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketConfig {
    pub enabled: bool,
    pub category: Option<String>,
    pub staff_roles: Vec<String>,
    pub max_per_user: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            category: None,
            staff_roles: Vec::new(),
            max_per_user: 1,
            extra: Map::new(),
        }
    }
}

/// Feature toggles consumed by the moderation handlers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModerationToggles {
    pub anti_spam: bool,
    pub anti_raid: bool,
    pub anti_nuke: bool,
    pub mute_role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub embed_color: String,
    pub footer: Option<String>,
    /// Emoji overrides keyed by purpose (`success`, `error`, ...).
    pub emojis: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            embed_color: DEFAULT_EMBED_COLOR.to_string(),
            footer: None,
            emojis: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}
