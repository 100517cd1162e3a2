//! Per-category content snapshots with stale-while-revalidate
//!
//! A category listing is stored as `{data, timestamp}` under
//! `uni_cache_{kind}_{category}`. Fresh snapshots are served as-is. Stale
//! ones are served immediately and refreshed in a background task. A miss
//! fetches, stores and returns.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::store::{get_json, set_json, StoreHandle};
use crate::models::ContentKind;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<T> {
    data: T,
    /// Capture time, Unix milliseconds
    timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    /// Served from an expired snapshot while a refresh runs
    Stale,
    Miss,
}

/// Result of a cache lookup
pub struct Cached<T> {
    pub data: T,
    pub status: CacheStatus,
    /// Background refresh spawned for a stale snapshot
    pub refresh: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct ContentCache {
    store: StoreHandle,
    ttl: chrono::Duration,
}

impl ContentCache {
    pub fn new(store: StoreHandle, ttl: chrono::Duration) -> Self {
        Self { store, ttl }
    }

    /// Default 12-hour freshness window
    pub fn with_default_ttl(store: StoreHandle) -> Self {
        Self::new(store, chrono::Duration::hours(12))
    }

    pub fn cache_key(kind: ContentKind, category_id: &str) -> String {
        format!("uni_cache_{}_{}", kind, category_id)
    }

    fn is_fresh(&self, timestamp: i64) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        now - timestamp <= self.ttl.num_milliseconds()
    }

    fn write_snapshot<T: Serialize>(store: &StoreHandle, key: &str, data: &T) {
        let snapshot = Snapshot {
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        if let Err(e) = set_json(store.as_ref(), key, &snapshot) {
            warn!("Failed to store snapshot {}: {}", key, e);
        }
    }

    /// Load a category listing through the cache
    ///
    /// `fetch` is only awaited inline on a miss; for a stale hit it runs on
    /// a spawned task and its failure keeps the old snapshot.
    pub async fn load<T, F, Fut, E>(
        &self,
        kind: ContentKind,
        category_id: &str,
        fetch: F,
    ) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let key = Self::cache_key(kind, category_id);

        let cached = match get_json::<Snapshot<T>>(self.store.as_ref(), &key) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Content cache read failed for {}: {}", key, e);
                None
            }
        };

        if let Some(snapshot) = cached {
            if self.is_fresh(snapshot.timestamp) {
                debug!("Content cache hit: {}", key);
                return Ok(Cached {
                    data: snapshot.data,
                    status: CacheStatus::Fresh,
                    refresh: None,
                });
            }

            debug!("Content cache stale, refreshing in background: {}", key);
            let store = self.store.clone();
            let pending = fetch();
            let refresh = tokio::spawn(async move {
                match pending.await {
                    Ok(data) => Self::write_snapshot(&store, &key, &data),
                    Err(e) => warn!("Background refresh of {} failed: {}", key, e),
                }
            });

            return Ok(Cached {
                data: snapshot.data,
                status: CacheStatus::Stale,
                refresh: Some(refresh),
            });
        }

        debug!("Content cache miss: {}", key);
        let data = fetch().await?;
        Self::write_snapshot(&self.store, &key, &data);

        Ok(Cached {
            data,
            status: CacheStatus::Miss,
            refresh: None,
        })
    }
}
