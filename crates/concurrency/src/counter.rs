// Implements a keyed counter whose map is only ever touched under its lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// [`GuardedCounter`] keeps a count per string key, every read and
/// write of the underlying map happens while holding its [`Mutex`].
///
/// The map itself is never handed out, callers only see copies of the
/// counts through [`GuardedCounter::get`] and [`GuardedCounter::snapshot`].
/// Share it between threads with an `Arc` or a scoped borrow.
///
/// The lock is not reentrant, none of the methods call back into user
/// code while holding it.
#[derive(Debug, Default)]
pub struct GuardedCounter {
    values: Mutex<HashMap<String, u64>>,
}

impl GuardedCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the count of `key`, starting from zero when the key
    /// was never seen.
    pub fn increment(&self, key: &str) {
        self.increment_by(key, 1);
    }

    pub fn increment_by(&self, key: &str, delta: u64) {
        let mut values = self.values();
        match values.get_mut(key) {
            Some(count) => *count = count.saturating_add(delta),
            None => {
                values.insert(key.to_owned(), delta);
            }
        }
    }

    /// Returns the current count of `key`, zero when absent.
    pub fn get(&self, key: &str) -> u64 {
        self.values().get(key).copied().unwrap_or(0)
    }

    /// Copies every count out while holding the lock once.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.values().clone()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    // Every mutation is a single map write so a panicking holder
    // cannot leave a half applied update behind.
    fn values(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
