//! Typed entity shapes and their defaults.

mod guild;
mod sanction;
mod user;

pub use guild::{
    Customization, GuildConfig, LogChannels, ModerationToggles, TicketConfig, WelcomeConfig,
    WelcomeEmbed, DEFAULT_EMBED_COLOR, DEFAULT_LOG_CATEGORIES,
};
pub use sanction::{Reversal, SanctionInput, SanctionRecord};
pub use user::{
    ActivityKind, Economy, GlobalStats, Leveling, ModerationSummary, Security, UserProfile,
};
