use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A cached JSON value and the moment it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.timestamp).to_std() {
            Ok(age) => age < ttl,
            // Timestamp in the future: clock moved backwards, treat as just fetched.
            Err(_) => true,
        }
    }
}

/// Snapshot of cache occupancy, as returned by `get_cache_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub fresh_entries: usize,
    pub stale_entries: usize,
    pub ttl_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest_entry: Option<DateTime<Utc>>,
}

/// Proof that a fetch was started for a key. Only the most recent ticket for
/// a key may populate it; invalidation and clearing retire outstanding tickets.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    key: String,
    serial: u64,
}

/// Only keys with an outstanding ticket are tracked in `in_flight`, so the
/// map is bounded by the number of concurrent fetches.
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, u64>,
    next_serial: u64,
}

/// Keyed TTL cache of JSON values with request-generation tracking.
#[derive(Clone, Debug)]
pub struct TtlCache {
    state: Arc<RwLock<CacheState>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_entries(ttl, HashMap::new())
    }

    /// Start from previously persisted entries.
    pub fn with_entries(ttl: Duration, entries: HashMap<String, CacheEntry>) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState {
                entries,
                ..CacheState::default()
            })),
            ttl,
        }
    }

    /// The cached value if it is still within the TTL.
    pub async fn get_fresh(&self, key: &str) -> Option<Value> {
        let state = self.state.read().await;
        let now = Utc::now();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .map(|entry| entry.value.clone())
    }

    /// The cached value regardless of age.
    pub async fn get_stale(&self, key: &str) -> Option<CacheEntry> {
        let state = self.state.read().await;
        state.entries.get(key).cloned()
    }

    pub async fn begin_fetch(&self, key: &str) -> FetchTicket {
        let mut state = self.state.write().await;
        state.next_serial += 1;
        let serial = state.next_serial;
        state.in_flight.insert(key.to_string(), serial);
        FetchTicket {
            key: key.to_string(),
            serial,
        }
    }

    /// Store `value` if `ticket` is still the latest for its key. Returns
    /// whether the cache was updated.
    pub async fn complete_fetch(&self, ticket: FetchTicket, value: Value) -> bool {
        let mut state = self.state.write().await;
        if state.in_flight.get(&ticket.key) != Some(&ticket.serial) {
            log::debug!(
                "Discarding superseded response for cache key '{}'",
                ticket.key
            );
            return false;
        }
        state.in_flight.remove(&ticket.key);
        state.entries.insert(ticket.key, CacheEntry::new(value));
        true
    }

    /// Retire `ticket` after its fetch failed. A newer ticket for the same
    /// key is left in place.
    pub async fn abandon_fetch(&self, ticket: FetchTicket) {
        let mut state = self.state.write().await;
        if state.in_flight.get(&ticket.key) == Some(&ticket.serial) {
            state.in_flight.remove(&ticket.key);
        }
    }

    /// Number of keys with a fetch still outstanding.
    pub async fn pending_fetches(&self) -> usize {
        self.state.read().await.in_flight.len()
    }

    /// Unconditionally store `value`, retiring any in-flight fetch.
    pub async fn insert(&self, key: &str, value: Value) {
        let mut state = self.state.write().await;
        state.in_flight.remove(key);
        state.entries.insert(key.to_string(), CacheEntry::new(value));
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        let mut state = self.state.write().await;
        state.in_flight.remove(key);
        state.entries.remove(key).is_some()
    }

    /// Remove every entry whose key starts with `prefix`. Returns the number
    /// of entries removed.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut state = self.state.write().await;
        state.in_flight.retain(|key, _| !key.starts_with(prefix));

        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        before - state.entries.len()
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.in_flight.clear();
    }

    pub async fn snapshot(&self) -> HashMap<String, CacheEntry> {
        self.state.read().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let now = Utc::now();
        let fresh_entries = state
            .entries
            .values()
            .filter(|entry| entry.is_fresh(self.ttl, now))
            .count();

        CacheStats {
            entries: state.entries.len(),
            fresh_entries,
            stale_entries: state.entries.len() - fresh_entries,
            ttl_secs: self.ttl.as_secs(),
            oldest_entry: state.entries.values().map(|e| e.timestamp).min(),
            newest_entry: state.entries.values().map(|e| e.timestamp).max(),
        }
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(super::DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fresh_entry_is_served() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("setting:tax_rate:store", json!(0.08)).await;

        assert_some_eq!(cache.get_fresh("setting:tax_rate:store").await, json!(0.08));
        assert_none!(cache.get_fresh("setting:missing:store").await);
    }

    #[tokio::test]
    async fn test_expired_entry_is_only_available_as_stale() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("config:tenant", json!({"tenantId": "t"})).await;

        assert_none!(cache.get_fresh("config:tenant").await);
        let stale = assert_some!(cache.get_stale("config:tenant").await);
        assert_eq!(stale.value, json!({"tenantId": "t"}));
    }

    #[tokio::test]
    async fn test_superseded_ticket_cannot_populate() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let first = cache.begin_fetch("theme:s1:_").await;
        let second = cache.begin_fetch("theme:s1:_").await;

        assert!(cache.complete_fetch(second, json!("newer")).await);
        assert!(!cache.complete_fetch(first, json!("older")).await);
        assert_some_eq!(cache.get_fresh("theme:s1:_").await, json!("newer"));
    }

    #[tokio::test]
    async fn test_invalidation_retires_in_flight_fetch() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let ticket = cache.begin_fetch("setting:tax_rate:resolved").await;
        cache.invalidate("setting:tax_rate:resolved").await;

        assert!(!cache.complete_fetch(ticket, json!(0.08)).await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_removes_all_variants() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("setting:tax_rate:store", json!(0.08)).await;
        cache.insert("setting:tax_rate:resolved", json!(0.08)).await;
        cache.insert("setting:currency:store", json!("EUR")).await;

        let removed = cache.invalidate_prefix("setting:tax_rate:").await;

        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
        assert_some!(cache.get_fresh("setting:currency:store").await);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent_and_retires_tickets() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.clear().await;
        assert!(cache.is_empty().await);

        cache.insert("config:tenant", json!({})).await;
        let ticket = cache.begin_fetch("config:tenant").await;
        cache.clear().await;
        cache.clear().await;

        assert!(!cache.complete_fetch(ticket, json!({})).await);
        assert_eq!(cache.stats().await, CacheStats {
            ttl_secs: 60,
            ..CacheStats::default()
        });
    }

    #[tokio::test]
    async fn test_tracking_does_not_grow_with_distinct_keys() {
        let cache = TtlCache::new(Duration::from_secs(60));

        for n in 0..500 {
            let key = format!("setting:key_{n}:store");
            let ticket = cache.begin_fetch(&key).await;
            if n % 2 == 0 {
                assert!(cache.complete_fetch(ticket, json!(n)).await);
            } else {
                cache.abandon_fetch(ticket).await;
            }
            cache.invalidate(&key).await;
        }
        assert_eq!(cache.pending_fetches().await, 0);

        for n in 0..100 {
            cache.insert(&format!("theme:s{n}:_"), json!({})).await;
            let _ticket = cache.begin_fetch(&format!("theme:s{n}:_")).await;
        }
        assert_eq!(cache.pending_fetches().await, 100);
        cache.clear().await;
        assert_eq!(cache.pending_fetches().await, 0);
    }

    #[tokio::test]
    async fn test_ticket_from_before_clear_stays_retired_after_refetch() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let stale = cache.begin_fetch("config:tenant").await;
        cache.clear().await;
        let fresh = cache.begin_fetch("config:tenant").await;

        assert!(!cache.complete_fetch(stale, json!("old")).await);
        assert!(cache.complete_fetch(fresh, json!("new")).await);
        assert_some_eq!(cache.get_fresh("config:tenant").await, json!("new"));
    }

    #[tokio::test]
    async fn test_abandoning_old_ticket_keeps_newer_one() {
        let cache = TtlCache::new(Duration::from_secs(60));

        let first = cache.begin_fetch("setting:currency:store").await;
        let second = cache.begin_fetch("setting:currency:store").await;
        cache.abandon_fetch(first).await;

        assert_eq!(cache.pending_fetches().await, 1);
        assert!(cache.complete_fetch(second, json!("EUR")).await);
    }

    #[tokio::test]
    async fn test_stats_split_fresh_and_stale() {
        let mut entries = HashMap::new();
        let mut old = CacheEntry::new(json!(1));
        old.timestamp = Utc::now() - chrono::Duration::minutes(10);
        entries.insert("setting:a:store".to_string(), old);
        entries.insert("setting:b:store".to_string(), CacheEntry::new(json!(2)));

        let cache = TtlCache::with_entries(Duration::from_secs(300), entries);
        let stats = cache.stats().await;

        assert_eq!(stats.entries, 2);
        assert_eq!(stats.fresh_entries, 1);
        assert_eq!(stats.stale_entries, 1);
        assert_lt!(stats.oldest_entry.unwrap(), stats.newest_entry.unwrap());
    }
}
