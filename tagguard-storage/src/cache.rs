//! TTL cache over binding lookups.
//!
//! Expiry is lazy: an entry past its TTL counts as missing even while it
//! still occupies a slot, so no background sweep is required. A bounded
//! capacity with oldest-first eviction keeps memory flat under churn
//! without changing observable behavior.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tagguard_core::{AccountId, IdentityBinding, StoreError, StoreResult};
use tracing::debug;

/// Configuration for the binding cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries, hits and confirmed absences alike.
    pub entry_ttl: Duration,
    /// Maximum number of entries held; the oldest entry is evicted first.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            entry_ttl: Duration::from_secs(300),
            max_entries: 1_000,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Set the capacity bound.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Create a cache config from environment variables.
    ///
    /// - `TAGGUARD_CACHE_TTL_SECS`: entry TTL in seconds (default: 300)
    /// - `TAGGUARD_CACHE_MAX_ENTRIES`: capacity bound (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            entry_ttl: std::env::var("TAGGUARD_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.entry_ttl),
            max_entries: std::env::var("TAGGUARD_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_entries),
        }
    }
}

/// One cached lookup result.
///
/// `value: None` records a confirmed "not registered" answer so repeated
/// lookups for unknown accounts skip the store until the TTL lapses.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Option<IdentityBinding>,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Result of probing the cache for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheProbe {
    /// A fresh entry was found; `None` is a cached confirmed absence.
    Fresh(Option<IdentityBinding>),
    /// Nothing usable cached; the caller must consult the store.
    Miss,
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses (including expiries).
    pub misses: u64,
    /// Number of entries dropped because their TTL lapsed.
    pub expired: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Shared TTL cache for account-to-binding lookups.
///
/// Holds a derived, time-bounded copy of store state and never originates
/// writes. Concurrent populates for one key may race; last write wins,
/// and both writers carry the same store-derived value, so the race is
/// harmless and deliberately unserialized.
pub struct BindingCache {
    entries: RwLock<HashMap<AccountId, CacheEntry>>,
    stats: RwLock<CacheStats>,
    config: CacheConfig,
}

impl BindingCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStats::default()),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Probe for a fresh entry, lazily dropping an expired one.
    pub fn probe(&self, account_id: AccountId) -> StoreResult<CacheProbe> {
        let expired = {
            let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
            match entries.get(&account_id) {
                None => {
                    self.bump(|s| s.misses += 1)?;
                    return Ok(CacheProbe::Miss);
                }
                Some(entry) if entry.is_expired(self.config.entry_ttl) => true,
                Some(entry) => {
                    let value = entry.value.clone();
                    self.bump(|s| s.hits += 1)?;
                    return Ok(CacheProbe::Fresh(value));
                }
            }
        };
        if expired {
            let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
            // Re-check under the write lock; a racing populate may have
            // refreshed the entry in the meantime.
            if let Some(entry) = entries.get(&account_id) {
                if entry.is_expired(self.config.entry_ttl) {
                    entries.remove(&account_id);
                    self.bump(|s| {
                        s.expired += 1;
                        s.misses += 1;
                    })?;
                    return Ok(CacheProbe::Miss);
                }
                let value = entry.value.clone();
                self.bump(|s| s.hits += 1)?;
                return Ok(CacheProbe::Fresh(value));
            }
            self.bump(|s| s.misses += 1)?;
        }
        Ok(CacheProbe::Miss)
    }

    /// Insert or replace the entry for an account.
    ///
    /// `None` records a confirmed absence. When the cache is full and the
    /// key is new, the oldest entry is evicted first.
    pub fn insert(
        &self,
        account_id: AccountId,
        value: Option<IdentityBinding>,
    ) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if !entries.contains_key(&account_id) && entries.len() >= self.config.max_entries {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| *key)
            {
                entries.remove(&oldest);
                self.bump(|s| s.evictions += 1)?;
                debug!(evicted = %oldest, "cache at capacity, evicted oldest entry");
            }
        }
        entries.insert(
            account_id,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Drop an entry immediately, regardless of TTL.
    pub fn invalidate(&self, account_id: AccountId) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(&account_id).is_some())
    }

    /// Drop every entry.
    pub fn clear(&self) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }

    /// Snapshot the usage counters.
    pub fn stats(&self) -> StoreResult<CacheStats> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut stats = self
            .stats
            .read()
            .map_err(|_| StoreError::LockPoisoned)?
            .clone();
        stats.entry_count = entries.len() as u64;
        Ok(stats)
    }

    fn bump(&self, f: impl FnOnce(&mut CacheStats)) -> StoreResult<()> {
        let mut stats = self.stats.write().map_err(|_| StoreError::LockPoisoned)?;
        f(&mut stats);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tagguard_core::IdentityTag;

    fn binding(account: i64, tag: &str) -> IdentityBinding {
        IdentityBinding::new(AccountId::new(account), IdentityTag::parse(tag).unwrap())
    }

    #[test]
    fn test_probe_misses_on_empty_cache() {
        let cache = BindingCache::new(CacheConfig::default());
        assert_eq!(cache.probe(AccountId::new(1)).unwrap(), CacheProbe::Miss);
        let stats = cache.stats().unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_insert_then_probe_hits() {
        let cache = BindingCache::new(CacheConfig::default());
        let b = binding(1, "RC463713");
        cache.insert(AccountId::new(1), Some(b.clone())).unwrap();

        let probe = cache.probe(AccountId::new(1)).unwrap();
        assert_eq!(probe, CacheProbe::Fresh(Some(b)));
        assert_eq!(cache.stats().unwrap().hits, 1);
    }

    #[test]
    fn test_absent_marker_is_a_fresh_hit() {
        let cache = BindingCache::new(CacheConfig::default());
        cache.insert(AccountId::new(1), None).unwrap();
        assert_eq!(
            cache.probe(AccountId::new(1)).unwrap(),
            CacheProbe::Fresh(None)
        );
    }

    #[test]
    fn test_expired_entry_counts_as_miss() {
        let cache = BindingCache::new(CacheConfig::new().with_ttl(Duration::from_millis(20)));
        cache
            .insert(AccountId::new(1), Some(binding(1, "RC463713")))
            .unwrap();
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.probe(AccountId::new(1)).unwrap(), CacheProbe::Miss);
        let stats = cache.stats().unwrap();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 0);
    }

    #[test]
    fn test_invalidate_drops_unexpired_entry() {
        let cache = BindingCache::new(CacheConfig::default());
        cache
            .insert(AccountId::new(1), Some(binding(1, "RC463713")))
            .unwrap();
        assert!(cache.invalidate(AccountId::new(1)).unwrap());
        assert!(!cache.invalidate(AccountId::new(1)).unwrap());
        assert_eq!(cache.probe(AccountId::new(1)).unwrap(), CacheProbe::Miss);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = BindingCache::new(CacheConfig::new().with_max_entries(2));
        cache
            .insert(AccountId::new(1), Some(binding(1, "AA000001")))
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        cache
            .insert(AccountId::new(2), Some(binding(2, "AA000002")))
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        cache
            .insert(AccountId::new(3), Some(binding(3, "AA000003")))
            .unwrap();

        // Account 1 was oldest and must be gone; 2 and 3 remain.
        assert_eq!(cache.probe(AccountId::new(1)).unwrap(), CacheProbe::Miss);
        assert!(matches!(
            cache.probe(AccountId::new(2)).unwrap(),
            CacheProbe::Fresh(Some(_))
        ));
        assert!(matches!(
            cache.probe(AccountId::new(3)).unwrap(),
            CacheProbe::Fresh(Some(_))
        ));
        let stats = cache.stats().unwrap();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entry_count, 2);
    }

    #[test]
    fn test_reinsert_replaces_without_eviction() {
        let cache = BindingCache::new(CacheConfig::new().with_max_entries(1));
        cache
            .insert(AccountId::new(1), Some(binding(1, "AA000001")))
            .unwrap();
        cache
            .insert(AccountId::new(1), Some(binding(1, "AA000002")))
            .unwrap();
        assert_eq!(cache.stats().unwrap().evictions, 0);
        let CacheProbe::Fresh(Some(b)) = cache.probe(AccountId::new(1)).unwrap() else {
            panic!("expected fresh entry");
        };
        assert_eq!(b.tag.as_str(), "AA000002");
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = BindingCache::new(CacheConfig::default());
        cache
            .insert(AccountId::new(1), Some(binding(1, "RC463713")))
            .unwrap();
        cache.insert(AccountId::new(2), None).unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().entry_count, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new()
            .with_ttl(Duration::from_secs(60))
            .with_max_entries(10);
        assert_eq!(config.entry_ttl, Duration::from_secs(60));
        assert_eq!(config.max_entries, 10);
    }
}
