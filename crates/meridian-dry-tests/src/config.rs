// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake.

use meridian_app_core::config::{ConfigError, ConfigStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory [`ConfigStore`] with call counters and injectable failures.
///
/// Clones share state, so a test can hand one clone to a `ConfigService`
/// and inspect the other.
///
/// # Example
///
/// ```
/// use meridian_dry_tests::InMemoryConfigStore;
/// use meridian_app_core::{ConfigService, SyncConfig};
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// let config: SyncConfig = service.load_or_init("sync").unwrap();
/// assert_eq!(config, SyncConfig::default());
/// assert_eq!(store.load_count(), 1);
/// assert_eq!(store.save_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    documents: HashMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fail_loads: bool,
    fail_saves: bool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding one document under `key`.
    pub fn with_document(key: &str, json: &str) -> Self {
        let store = Self::new();
        store
            .state()
            .documents
            .insert(key.to_owned(), json.as_bytes().to_vec());
        store
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every `load_raw` fail with `ConfigError::Other`.
    pub fn set_fail_on_load(&self, fail: bool) {
        self.state().fail_loads = fail;
    }

    /// Make every `save_raw` fail with `ConfigError::Other`.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state().fail_saves = fail;
    }

    /// `load_raw` attempts, failed ones included.
    pub fn load_count(&self) -> usize {
        self.state().loads
    }

    /// `save_raw` attempts, failed ones included.
    pub fn save_count(&self) -> usize {
        self.state().saves
    }

    /// True if a document is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.state().documents.contains_key(key)
    }

    /// Stored document for `key`, decoded as UTF-8.
    pub fn document(&self, key: &str) -> Option<String> {
        self.state()
            .documents
            .get(key)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut state = self.state();
        state.loads += 1;
        if state.fail_loads {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        state.documents.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut state = self.state();
        state.saves += 1;
        if state.fail_saves {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        state.documents.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use meridian_app_core::{ConfigService, SyncConfig};

    #[test]
    fn existing_document_is_not_overwritten() {
        let store = InMemoryConfigStore::with_document("sync", r#"{"hold_time_ms": 5}"#);
        let service = ConfigService::new(store.clone());

        let config: SyncConfig = service.load_or_init("sync").unwrap();
        assert_eq!(config.hold_time_ms, 5);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn load_failure_propagates() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_load(true);
        let service = ConfigService::new(store.clone());

        let result: Result<Option<SyncConfig>, _> = service.load("sync");
        assert!(matches!(result, Err(ConfigError::Other(_))));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn failed_save_stores_nothing() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_save(true);
        assert!(store.save_raw("sync", b"{}").is_err());
        assert!(!store.contains_key("sync"));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn clones_share_documents() {
        let a = InMemoryConfigStore::new();
        let b = a.clone();
        a.save_raw("sync", b"{}").unwrap();
        assert_eq!(b.document("sync").as_deref(), Some("{}"));
    }

    #[test]
    fn malformed_document_is_a_serde_error() {
        let store = InMemoryConfigStore::with_document("sync", "{not json");
        let service = ConfigService::new(store);
        let result: Result<Option<SyncConfig>, _> = service.load("sync");
        assert!(matches!(result, Err(ConfigError::Serde(_))));
    }
}
