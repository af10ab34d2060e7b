//! Short-lived in-memory cache for quotes and chart series.
//!
//! Entries are keyed by `(exchange, key)` and expire after a fixed TTL. A TTL
//! of zero disables caching entirely. Only successful values are ever stored.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::types::enums::Exchange;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
}

/// TTL cache keyed by exchange and a request key (`"quote"`, `"chart:1M"`, ...).
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<(Exchange, String), CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// False when built with a zero TTL.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fresh value for the key, if any.
    pub async fn get(&self, exchange: Exchange, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(&(exchange, key.to_owned()))
            .filter(|e| e.cached_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Store `value`, dropping any expired entries first.
    pub async fn insert(&self, exchange: Exchange, key: &str, value: V) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        // drop anything stale while holding the lock anyway
        let ttl = self.ttl;
        entries.retain(|_, e| e.cached_at.elapsed() < ttl);
        entries.insert(
            (exchange, key.to_owned()),
            CacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Number of entries, live or expired.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(15));
        cache.insert(Exchange::NSE, "quote", 1u32).await;
        assert_eq!(cache.get(Exchange::NSE, "quote").await, Some(1));
        assert_eq!(cache.get(Exchange::BSE, "quote").await, None);

        tokio::time::advance(Duration::from_secs(16)).await;
        assert_eq!(cache.get(Exchange::NSE, "quote").await, None);
    }

    #[tokio::test]
    async fn zero_ttl_disables() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(Exchange::NSE, "quote", 1u32).await;
        assert_eq!(cache.get(Exchange::NSE, "quote").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_evicts_stale_entries() {
        let cache = TtlCache::new(Duration::from_secs(5));
        cache.insert(Exchange::NSE, "chart:1M", 1u32).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.insert(Exchange::NSE, "chart:3M", 2u32).await;
        assert_eq!(cache.len().await, 1);
    }
}
