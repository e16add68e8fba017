// src/services/profile_cache.rs
// DOCUMENTATION: Simple in-memory cache for username -> profile lookups
// PURPOSE: Avoid repeated user resolution when parsing @mentions

use crate::models::PublicUser;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use serde::{Serialize, Deserialize};

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe TTL cache of public profiles keyed by lowercase username
pub struct ProfileCache {
    store: Arc<RwLock<HashMap<String, CacheEntry<PublicUser>>>>,
    default_ttl: Duration,
}

impl ProfileCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    fn key(username: &str) -> String {
        username.to_lowercase()
    }

    /// Get cached profile
    pub async fn get(&self, username: &str) -> Option<PublicUser> {
        let store = self.store.read().await;

        if let Some(entry) = store.get(&Self::key(username)) {
            if !entry.is_expired() {
                log::debug!("Profile cache HIT for {}", username);
                return Some(entry.data.clone());
            } else {
                log::debug!("Profile cache EXPIRED for {}", username);
            }
        } else {
            log::debug!("Profile cache MISS for {}", username);
        }

        None
    }

    /// Cache a profile under its username
    pub async fn set(&self, profile: PublicUser) {
        let mut store = self.store.write().await;
        let key = Self::key(&profile.username);
        store.insert(key, CacheEntry::new(profile, self.default_ttl));
    }

    /// Drop one username, used when admins mutate accounts
    pub async fn invalidate(&self, username: &str) {
        let mut store = self.store.write().await;
        if store.remove(&Self::key(username)).is_some() {
            log::debug!("Profile cache invalidated for {}", username);
        }
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Profile cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<ProfileCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(username: &str) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = ProfileCache::new(60);
        let alice = profile("alice");

        cache.set(alice.clone()).await;
        let result = cache.get("alice").await;

        assert_eq!(result, Some(alice));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let cache = ProfileCache::new(60);
        cache.set(profile("Alice")).await;

        assert!(cache.get("ALICE").await.is_some());
        assert!(cache.get("alice").await.is_some());
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = ProfileCache::new(1); // 1 second TTL
        cache.set(profile("alice")).await;

        // Should exist immediately
        assert!(cache.get("alice").await.is_some());

        // Wait for expiration
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Should be expired
        assert!(cache.get("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_removes_entry() {
        let cache = ProfileCache::new(60);
        cache.set(profile("alice")).await;

        cache.invalidate("alice").await;
        assert!(cache.get("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_cleanup() {
        let cache = ProfileCache::new(1);

        cache.set(profile("alice")).await;
        cache.set(profile("bob")).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        cache.cleanup().await;

        let stats = cache.stats().await;
        assert_eq!(stats.active_entries, 0);
        assert_eq!(stats.total_entries, 0);
    }
}
