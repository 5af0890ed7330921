//! Subscription types for live store updates.

use serde::{Deserialize, Serialize};

use crate::types::{SanctionId, SanctionKind};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 1000
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            filter: SubscriptionFilter::all(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Restrict guild and sanction events to these guilds (None = all).
    pub guild_ids: Option<Vec<String>>,

    /// Include guild config events.
    pub include_guilds: bool,

    /// Include user profile events.
    pub include_users: bool,

    /// Include sanction events.
    pub include_sanctions: bool,

    /// Include named document writes.
    pub include_documents: bool,
}

impl SubscriptionFilter {
    /// Guild config events only.
    pub fn guilds() -> Self {
        Self {
            include_guilds: true,
            ..Default::default()
        }
    }

    pub fn users() -> Self {
        Self {
            include_users: true,
            ..Default::default()
        }
    }

    pub fn sanctions() -> Self {
        Self {
            include_sanctions: true,
            ..Default::default()
        }
    }

    pub fn documents() -> Self {
        Self {
            include_documents: true,
            ..Default::default()
        }
    }

    /// Subscribe to everything.
    pub fn all() -> Self {
        Self {
            guild_ids: None,
            include_guilds: true,
            include_users: true,
            include_sanctions: true,
            include_documents: true,
        }
    }

    /// Narrow guild-scoped events to the given guilds.
    pub fn in_guilds(mut self, guild_ids: Vec<String>) -> Self {
        self.guild_ids = Some(guild_ids);
        self
    }
}

/// Events emitted after a successful write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    // --- Guild Events ---
    GuildChanged {
        guild_id: String,
    },

    GuildDeleted {
        guild_id: String,
    },

    // --- User Events ---
    UserChanged {
        user_id: String,
    },

    // --- Sanction Events ---
    SanctionAdded {
        id: SanctionId,
        kind: SanctionKind,
        user_id: String,
        guild_id: Option<String>,
    },

    SanctionReversed {
        id: SanctionId,
        kind: SanctionKind,
        user_id: String,
        guild_id: Option<String>,
    },

    // --- Document Events ---
    /// A named document was rewritten.
    DocumentWritten {
        path: String,
    },

    // --- Lifecycle Events ---
    /// Subscription was dropped.
    Dropped {
        reason: DropReason,
    },
}

impl StoreEvent {
    /// Guild the event is scoped to, if any.
    pub fn guild_id(&self) -> Option<&str> {
        match self {
            StoreEvent::GuildChanged { guild_id } | StoreEvent::GuildDeleted { guild_id } => {
                Some(guild_id.as_str())
            }
            StoreEvent::SanctionAdded { guild_id, .. }
            | StoreEvent::SanctionReversed { guild_id, .. } => guild_id.as_deref(),
            _ => None,
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.receiver.try_iter().collect()
    }
}
