use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A set of strings shared between workers
///
/// Every mutation goes through [`ConcurrentSet::add`], an exclusive
/// test-and-insert under a single mutex. Keys are never removed, so the set
/// only grows for the lifetime of one crawl run.
#[derive(Debug, Default)]
pub struct ConcurrentSet {
    entries: Mutex<HashSet<String>>,
}

/// Canonical URLs whose pipeline has been started
pub type VisitedSet = ConcurrentSet;

/// Hosts of external scripts, images and stylesheets
pub type ResourceRegistry = ConcurrentSet;

impl ConcurrentSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key` unless it is already present
    ///
    /// Returns `true` only for the call that performed the insertion, so
    /// exactly one of any number of racing callers wins.
    pub fn add(&self, key: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains(key) {
            return false;
        }
        entries.insert(key.to_string())
    }

    /// Returns whether `key` has been added
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    /// Number of keys added so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns an independent, sorted copy of the keys
    ///
    /// The lock is held only while copying; concurrent `add`s proceed as soon
    /// as the copy is done and are not reflected in the returned set.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.lock().iter().cloned().collect()
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
