//! Subscription system for live store updates.
//!
//! Observers in the same process (the web dashboard, log forwarders) can
//! subscribe to changes instead of polling files:
//! - Guild config writes and deletions
//! - User profile writes
//! - Sanctions added or reversed
//! - Named document rewrites
//!
//! Events are only emitted after the write reached disk. Each subscriber has
//! a bounded buffer; a subscriber that falls behind is dropped. One slot is
//! held back for the final `Dropped` event, after which `recv` returns an error.
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionFilter::sanctions());
//!
//! while let Ok(event) = handle.recv() {
//!     match event {
//!         StoreEvent::SanctionAdded { id, user_id, .. } => println!("{user_id}: {id}"),
//!         StoreEvent::Dropped { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
