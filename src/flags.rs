//! One-shot UI flags ("show this banner once").
//!
//! A small process-wide key-value store with read-once/write-on-first-render
//! semantics, behind a trait so tests can substitute their own store instead
//! of relying on ambient global state.

use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;

/// Store of one-shot UI flags keyed by string.
pub trait FlagStore {
    /// Whether the flag has already been consumed.
    fn seen(&self, key: &str) -> bool;

    /// Mark the flag as consumed.
    fn mark_seen(&mut self, key: &str);

    /// Read-once check: true exactly on the first call per key, marking the
    /// flag consumed as a side effect.
    fn should_show(&mut self, key: &str) -> bool {
        if self.seen(key) {
            false
        } else {
            self.mark_seen(key);
            true
        }
    }
}

/// In-memory flag store.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    seen: HashSet<String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    fn mark_seen(&mut self, key: &str) {
        self.seen.insert(key.to_string());
    }
}

/// Process-wide default flag store.
static FLAGS: Lazy<Mutex<MemoryFlagStore>> = Lazy::new(|| Mutex::new(MemoryFlagStore::new()));

/// Run a closure against the process-wide flag store.
pub fn with_flags<F, R>(f: F) -> R
where
    F: FnOnce(&mut MemoryFlagStore) -> R,
{
    let mut flags = FLAGS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut flags)
}
