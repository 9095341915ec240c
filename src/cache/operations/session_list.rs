use std::sync::Arc;
use std::time::Duration;

use crate::cache::keys::{SessionListKey, session_list_user_prefix};
use crate::cache::models::CachedSessionList;
use crate::cache::operations::kv::KeyValueCache;
use crate::cache::store::SharedStore;

/// Store failures never escape: a failed read is a miss, a failed write or
/// invalidation is logged and dropped.
#[derive(Clone)]
pub struct SessionListCache {
    kv: KeyValueCache,
    ttl: Duration,
}

impl SessionListCache {
    pub fn new(store: Arc<dyn SharedStore>, ttl: Duration) -> Self {
        Self {
            kv: KeyValueCache::new(store),
            ttl,
        }
    }

    /// 配置的过期时间
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 读取缓存的分页
    pub async fn read(&self, key: &SessionListKey) -> Option<CachedSessionList> {
        let cache_key = key.cache_key();
        match self.kv.get::<CachedSessionList>(&cache_key).await {
            Ok(Some(cached)) if cached.is_consistent() => {
                tracing::debug!("Session list cache hit: {}", cache_key);
                Some(cached)
            }
            Ok(Some(_)) => {
                tracing::warn!("Discarding inconsistent session list cache entry: {}", cache_key);
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Session list cache read failed for {}: {}", cache_key, e);
                None
            }
        }
    }

    /// 写入分页快照
    pub async fn write(&self, key: &SessionListKey, entry: &CachedSessionList, ttl: Duration) {
        if !entry.is_consistent() {
            tracing::warn!(
                "Refusing to cache {} rows for page size {}",
                entry.content.len(),
                entry.size
            );
            return;
        }
        let cache_key = key.cache_key();
        match self.kv.put(&cache_key, entry, ttl).await {
            Ok(_) => tracing::debug!("Set session list cache: {}", cache_key),
            Err(e) => tracing::warn!("Session list cache write failed for {}: {}", cache_key, e),
        }
    }

    /// 清除用户的全部会话列表缓存
    pub async fn invalidate_user(&self, user_id: &str) -> u64 {
        let prefix = session_list_user_prefix(user_id);
        match self.kv.delete_by_prefix(&prefix).await {
            Ok(removed) => {
                tracing::debug!("Evicted {} session list entries under {}", removed, prefix);
                removed
            }
            Err(e) => {
                tracing::warn!("Session list invalidation failed for {}: {}", prefix, e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;
    use crate::config::Config;
    use crate::routes::session::model::SessionResponse;
    use chrono::Utc;
    use uuid::Uuid;

    fn configured_ttl() -> Duration {
        Config::from_lookup(|name| (name == "DATABASE_URL").then(|| "postgres://unused".to_string()))
            .unwrap()
            .session_list_ttl()
    }

    fn summary(title: &str) -> SessionResponse {
        let id = Uuid::new_v4();
        SessionResponse {
            id,
            session_id: id,
            title: title.to_string(),
            favorite: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(rows: usize, total: i64, size: u32) -> CachedSessionList {
        CachedSessionList {
            content: (0..rows).map(|i| summary(&format!("chat {i}"))).collect(),
            total_elements: total,
            total_pages: crate::models::page::total_pages(total, size),
            size,
            number: 0,
        }
    }

    fn cache() -> (Arc<MemoryStore>, SessionListCache) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), SessionListCache::new(store, configured_ttl()))
    }

    #[tokio::test]
    async fn never_written_key_reads_absent() {
        let (_, cache) = cache();
        assert_eq!(cache.read(&SessionListKey::new("u1", None, 0, 20)).await, None);
    }

    #[tokio::test]
    async fn write_then_read_returns_the_stored_entry() {
        let (_, cache) = cache();
        let key = SessionListKey::new("u1", None, 0, 20);
        let stored = entry(5, 5, 20);

        cache.write(&key, &stored, cache.ttl()).await;
        let read = cache.read(&key).await.unwrap();
        assert_eq!(read, stored);
        assert_eq!(read.total_elements, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let (_, cache) = cache();
        let key = SessionListKey::new("u1", Some(true), 0, 20);
        cache.write(&key, &entry(1, 1, 20), cache.ttl()).await;

        tokio::time::advance(cache.ttl() - Duration::from_secs(1)).await;
        assert!(cache.read(&key).await.is_some());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.read(&key).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_user_removes_only_that_users_pages() {
        let (_, cache) = cache();
        let u1_pages = [
            SessionListKey::new("u1", None, 0, 20),
            SessionListKey::new("u1", Some(true), 0, 20),
            SessionListKey::new("u1", None, 3, 5),
        ];
        let u2_page = SessionListKey::new("u2", None, 0, 20);
        let lookalike = SessionListKey::new("u10", None, 0, 20);
        for key in u1_pages.iter().chain([&u2_page, &lookalike]) {
            cache.write(key, &entry(1, 1, key.size), cache.ttl()).await;
        }

        assert_eq!(cache.invalidate_user("u1").await, 3);
        for key in &u1_pages {
            assert!(cache.read(key).await.is_none());
        }
        assert!(cache.read(&u2_page).await.is_some());
        assert!(cache.read(&lookalike).await.is_some());
    }

    #[tokio::test]
    async fn oversized_snapshots_are_not_cached() {
        let (store, cache) = cache();
        let key = SessionListKey::new("u1", None, 0, 2);
        cache.write(&key, &entry(3, 3, 2), cache.ttl()).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn store_outage_reads_as_miss() {
        let (store, cache) = cache();
        let key = SessionListKey::new("u1", None, 0, 20);
        cache.write(&key, &entry(1, 1, 20), cache.ttl()).await;

        store.set_unavailable(true);
        assert!(cache.read(&key).await.is_none());
        assert_eq!(cache.invalidate_user("u1").await, 0);
        cache.write(&key, &entry(2, 2, 20), cache.ttl()).await;

        store.set_unavailable(false);
        assert_eq!(cache.read(&key).await.unwrap().total_elements, 1);
    }
}
