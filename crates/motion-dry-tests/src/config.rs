// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Memory-backed [`ConfigStore`] for preference tests.

use motion_app_core::config::{ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared in-memory blobs with attempt counters and injectable failures.
///
/// Clones share state, so a test can hand one clone to a service and keep
/// another for assertions.
///
/// ```
/// use motion_app_core::prefs::{PrefsService, RebuildPrefs};
/// use motion_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// let prefs = PrefsService::new(store.clone());
/// prefs.save(&RebuildPrefs::default()).unwrap();
/// assert_eq!(store.save_count(), 1);
/// assert!(store.contains_key("rebuild-prefs"));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Default)]
struct Shared {
    blobs: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    broken_load: bool,
    broken_save: bool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `data` under `key`.
    pub fn with_raw(key: &str, data: &[u8]) -> Self {
        let store = Self::new();
        store.shared().blobs.insert(key.to_owned(), data.to_vec());
        store
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// While `fail` is set, every `load_raw` returns a backend error.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.shared().broken_load = fail;
    }

    /// While `fail` is set, every `save_raw` returns a backend error and
    /// stores nothing.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.shared().broken_save = fail;
    }

    /// `load_raw` calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.shared().loads
    }

    /// `save_raw` calls so far, failed ones included.
    pub fn save_count(&self) -> usize {
        self.shared().saves
    }

    /// Keys holding a blob, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.shared().blobs.keys().cloned().collect()
    }

    /// Returns `true` if `key` holds a blob.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared().blobs.contains_key(key)
    }

    /// Blob under `key`, read without counting as a load.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.shared().blobs.get(key).cloned()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut shared = self.shared();
        shared.loads += 1;
        if shared.broken_load {
            return Err(ConfigError::Backend(format!("injected load failure for {key}")));
        }
        shared.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut shared = self.shared();
        shared.saves += 1;
        if shared.broken_save {
            return Err(ConfigError::Backend(format!("injected save failure for {key}")));
        }
        shared.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn blobs_survive_a_save_load_cycle() {
        let store = InMemoryConfigStore::new();
        store.save_raw("prefs", b"{}").unwrap();
        assert_eq!(store.load_raw("prefs").unwrap(), b"{}");
        assert_eq!((store.load_count(), store.save_count()), (1, 1));
    }

    #[test]
    fn broken_save_is_counted_and_stores_nothing() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_save(true);
        assert!(matches!(
            store.save_raw("prefs", b"{}"),
            Err(ConfigError::Backend(_))
        ));
        assert_eq!(store.save_count(), 1);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn clones_see_the_same_blobs_and_faults() {
        let a = InMemoryConfigStore::with_raw("prefs", b"x");
        let b = a.clone();
        b.set_fail_on_load(true);
        assert!(a.load_raw("prefs").is_err());
        assert_eq!(b.load_count(), 1);
        assert_eq!(a.raw("prefs").unwrap(), b"x");
    }
}
