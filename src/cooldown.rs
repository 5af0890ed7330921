//! Per-command, per-user cooldowns.
//!
//! Lives for the duration of the process and is handed to command handlers
//! explicitly. Entries expire lazily when checked; `sweep` drops the expired
//! ones in bulk and can be called from a periodic task.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct CooldownTracker {
    /// (command, user) -> time the cooldown ends.
    entries: Mutex<HashMap<(String, String), Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cooldown for `user` on `command` unless one is running.
    ///
    /// Returns the remaining time when the user is still cooling down.
    pub fn check_and_touch(
        &self,
        command: &str,
        user: &str,
        cooldown: Duration,
    ) -> Result<(), Duration> {
        self.check_and_touch_at(command, user, cooldown, Instant::now())
    }

    fn check_and_touch_at(
        &self,
        command: &str,
        user: &str,
        cooldown: Duration,
        now: Instant,
    ) -> Result<(), Duration> {
        let mut entries = self.entries.lock();
        let key = (command.to_string(), user.to_string());

        if let Some(until) = entries.get(&key) {
            if *until > now {
                return Err(*until - now);
            }
        }

        entries.insert(key, now + cooldown);
        Ok(())
    }

    /// Forget any cooldown `user` has on `command`.
    pub fn reset(&self, command: &str, user: &str) {
        self.entries
            .lock()
            .remove(&(command.to_string(), user.to_string()));
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, until| *until > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
