//! Persisted favorites set
//!
//! Stored under `uni_favorites` as a JSON array of content ids, in the order
//! they were added. Every toggle is one read-modify-write of that key,
//! serialized process-wide so concurrent toggles never drop each other.

use std::sync::Mutex;

use lazy_static::lazy_static;

use super::store::{get_json, set_json, StoreHandle, StoreResult};

pub const FAVORITES_KEY: &str = "uni_favorites";

lazy_static! {
    static ref TOGGLE_LOCK: Mutex<()> = Mutex::new(());
}

#[derive(Clone)]
pub struct FavoritesStore {
    store: StoreHandle,
}

impl FavoritesStore {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    fn load(&self) -> StoreResult<Vec<String>> {
        Ok(get_json::<Vec<String>>(self.store.as_ref(), FAVORITES_KEY)?.unwrap_or_default())
    }

    /// All favorite ids, oldest first
    pub fn list(&self) -> StoreResult<Vec<String>> {
        self.load()
    }

    pub fn is_favorite(&self, content_id: &str) -> StoreResult<bool> {
        Ok(self.load()?.iter().any(|id| id == content_id))
    }

    /// Flip membership and persist; returns the new membership
    pub fn toggle(&self, content_id: &str) -> StoreResult<bool> {
        // The guard protects no data, so a poisoned lock is still usable
        let _guard = TOGGLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut favorites = self.load()?;
        let now_favorite = match favorites.iter().position(|id| id == content_id) {
            Some(_) => {
                favorites.retain(|id| id != content_id);
                false
            }
            None => {
                favorites.push(content_id.to_string());
                true
            }
        };

        set_json(self.store.as_ref(), FAVORITES_KEY, &favorites)?;
        tracing::debug!(content_id, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::{KeyValueStore, MemoryStore, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts writes so tests can assert one persisted write per toggle
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let store = Arc::new(CountingStore::default());
        let favorites = FavoritesStore::new(store.clone());

        assert!(favorites.toggle("vod_42").unwrap());
        assert_eq!(favorites.list().unwrap(), vec!["vod_42".to_string()]);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"["vod_42"]"#)
        );

        assert!(!favorites.toggle("vod_42").unwrap());
        assert!(favorites.list().unwrap().is_empty());
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_membership_check_is_read_only() {
        let store = Arc::new(CountingStore::default());
        let favorites = FavoritesStore::new(store.clone());

        assert!(!favorites.is_favorite("live_5").unwrap());
        assert!(!favorites.is_favorite("live_5").unwrap());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_toggle_keeps_other_entries() {
        let favorites = FavoritesStore::new(MemoryStore::handle());
        favorites.toggle("live_5").unwrap();
        favorites.toggle("vod_42").unwrap();
        favorites.toggle("series_7").unwrap();
        favorites.toggle("vod_42").unwrap();

        assert_eq!(
            favorites.list().unwrap(),
            vec!["live_5".to_string(), "series_7".to_string()]
        );
        assert!(favorites.is_favorite("series_7").unwrap());
    }

    #[test]
    fn test_reads_state_written_elsewhere() {
        let store = MemoryStore::handle();
        store.set(FAVORITES_KEY, r#"["live_9"]"#).unwrap();

        let favorites = FavoritesStore::new(store);
        assert!(favorites.is_favorite("live_9").unwrap());
    }

    #[test]
    fn test_concurrent_toggles_keep_every_id() {
        let favorites = FavoritesStore::new(MemoryStore::handle());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let favorites = favorites.clone();
                std::thread::spawn(move || favorites.toggle(&format!("live_{}", i)).unwrap())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }

        let mut ids = favorites.list().unwrap();
        ids.sort();
        let mut expected: Vec<String> = (0..16).map(|i| format!("live_{}", i)).collect();
        expected.sort();
        assert_eq!(ids, expected);
    }
}
