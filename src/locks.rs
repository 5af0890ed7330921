//! Per-file write locks.
//!
//! Each document path gets its own mutex, so a read-merge-write cycle on one
//! file never interleaves with another write to the same file, while writes
//! to different files proceed independently.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prune idle entries once the table grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

pub type KeyGuard = ArcMutexGuard<RawMutex, ()>;

#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the lock for `path` is held.
    pub fn lock(&self, path: &Path) -> KeyGuard {
        let entry = {
            let mut locks = self.locks.lock();
            if locks.len() > PRUNE_THRESHOLD {
                locks.retain(|_, m| Arc::strong_count(m) > 1);
            }
            Arc::clone(locks.entry(path.to_path_buf()).or_default())
        };
        entry.lock_arc()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
