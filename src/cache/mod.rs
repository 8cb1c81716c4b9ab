//! Response cache over durable key-value storage.
//!
//! Entries live under the `api_cache_` key prefix as JSON `{data, timestamp}`.
//! Expiry is lazy: a stale entry is deleted when it is read, never swept.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{CacheKey, CachedResponse};
use crate::store::KeyValueStore;

pub const CACHE_PREFIX: &str = "api_cache_";
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        Self {
            store,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn storage_key(key: &CacheKey) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }

    /// Returns cached data for `key`, treating expired entries as absent.
    pub fn read(&self, key: &CacheKey) -> Result<Option<Value>> {
        let storage_key = Self::storage_key(key);

        let Some(raw) = self.store.get(&storage_key)? else {
            debug!(key = %key, "cache miss");
            return Ok(None);
        };

        let entry: CachedResponse = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "dropping unreadable cache entry");
                self.store.remove(&storage_key)?;
                return Ok(None);
            }
        };

        let now = Utc::now().timestamp_millis();
        if entry.is_expired(now, self.ttl.num_milliseconds()) {
            debug!(key = %key, age_ms = entry.age_ms(now), "cache entry expired");
            self.store.remove(&storage_key)?;
            return Ok(None);
        }

        debug!(key = %key, "cache hit");
        Ok(Some(entry.data))
    }

    pub fn write(&self, key: &CacheKey, data: &Value) -> Result<()> {
        let entry = CachedResponse::new(data.clone());
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&Self::storage_key(key), &raw)?;
        debug!(key = %key, "cached response");
        Ok(())
    }

    /// Cache keys currently stored, without the storage prefix.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .keys_with_prefix(CACHE_PREFIX)?
            .into_iter()
            .map(|k| k[CACHE_PREFIX.len()..].to_string())
            .collect())
    }

    pub fn clear_all(&self) -> Result<usize> {
        let keys = self.store.keys_with_prefix(CACHE_PREFIX)?;
        let removed = self.store.remove_many(&keys)?;
        info!(removed, "cleared response cache");
        Ok(removed)
    }

    /// Removes every entry whose key contains `family`.
    pub fn clear_matching(&self, family: &str) -> Result<usize> {
        let keys: Vec<String> = self
            .store
            .keys_with_prefix(CACHE_PREFIX)?
            .into_iter()
            .filter(|k| k[CACHE_PREFIX.len()..].contains(family))
            .collect();
        let removed = self.store.remove_many(&keys)?;
        info!(family, removed, "cleared cached responses");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Method;
    use crate::store::SqliteStore;
    use serde_json::json;

    fn cache() -> (ResponseCache, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        (ResponseCache::new(store.clone()), store)
    }

    #[test]
    fn test_write_then_read() {
        let (cache, store) = cache();
        let key = CacheKey::new(Method::Get, "/sermons?page=1", "");

        cache.write(&key, &json!({"sermons": [1, 2]})).unwrap();

        assert_eq!(cache.read(&key).unwrap(), Some(json!({"sermons": [1, 2]})));
        assert!(store
            .get("api_cache_GET:/sermons?page=1:")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_expired_entry_is_deleted_on_read() {
        let (cache, store) = cache();
        let key = CacheKey::new(Method::Get, "/news", "");
        let stale = CachedResponse {
            data: json!({"news": ["old"]}),
            timestamp: Utc::now().timestamp_millis() - Duration::hours(25).num_milliseconds(),
        };
        store
            .set(
                &ResponseCache::storage_key(&key),
                &serde_json::to_string(&stale).unwrap(),
            )
            .unwrap();

        assert_eq!(cache.read(&key).unwrap(), None);
        assert_eq!(store.get(&ResponseCache::storage_key(&key)).unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let (cache, store) = cache();
        let key = CacheKey::new(Method::Get, "/events", "");
        store
            .set(&ResponseCache::storage_key(&key), "not json")
            .unwrap();

        assert_eq!(cache.read(&key).unwrap(), None);
    }

    #[test]
    fn test_clear_matching_only_touches_family() {
        let (cache, store) = cache();
        cache
            .write(&CacheKey::new(Method::Get, "/podcasts?page=1", ""), &json!(1))
            .unwrap();
        cache
            .write(&CacheKey::new(Method::Get, "/podcasts/7", ""), &json!(2))
            .unwrap();
        cache
            .write(&CacheKey::new(Method::Get, "/sermons", ""), &json!(3))
            .unwrap();

        assert_eq!(cache.clear_matching("podcasts").unwrap(), 2);
        assert_eq!(cache.keys().unwrap(), vec!["GET:/sermons:".to_string()]);
        assert!(store.get("api_cache_GET:/sermons:").unwrap().is_some());
    }

    #[test]
    fn test_clear_all_keeps_foreign_keys() {
        let (cache, store) = cache();
        store.set("session_token", "abc").unwrap();
        cache
            .write(&CacheKey::new(Method::Get, "/devotions", ""), &json!([]))
            .unwrap();

        assert_eq!(cache.clear_all().unwrap(), 1);
        assert!(cache.keys().unwrap().is_empty());
        assert_eq!(store.get("session_token").unwrap(), Some("abc".to_string()));
    }
}
