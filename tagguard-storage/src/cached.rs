//! Read-through, write-through store wrapper.

use std::sync::Arc;

use tagguard_core::{AccountId, IdentityBinding, IdentityTag, StoreResult};
use tracing::debug;

use crate::cache::{BindingCache, CacheConfig, CacheProbe, CacheStats};
use crate::store::{BindingStore, CreateOutcome, DeleteOutcome, UpdateOutcome};

/// Combines a [`BindingStore`] with a [`BindingCache`].
///
/// Reads go through the cache, caching found and not-found results alike.
/// Every mutation is durable in the store before the cache sees it, so a
/// concurrent uniqueness check can never observe a cache-only write.
/// Uniqueness probes and admin enumeration always bypass the cache: a
/// stale cache must never let a duplicate tag through.
pub struct CachedStore<S: BindingStore> {
    store: Arc<S>,
    cache: BindingCache,
}

impl<S: BindingStore> CachedStore<S> {
    pub fn new(store: Arc<S>, config: CacheConfig) -> Self {
        Self {
            store,
            cache: BindingCache::new(config),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the cache usage counters.
    pub fn cache_stats(&self) -> StoreResult<CacheStats> {
        self.cache.stats()
    }

    /// Read-through lookup for an account's binding.
    pub async fn get(&self, account_id: AccountId) -> StoreResult<Option<IdentityBinding>> {
        if let CacheProbe::Fresh(value) = self.cache.probe(account_id)? {
            return Ok(value);
        }
        let fetched = self.store.get_by_account(account_id).await?;
        self.cache.insert(account_id, fetched.clone())?;
        debug!(%account_id, found = fetched.is_some(), "binding fetched from store");
        Ok(fetched)
    }

    /// Create in the store, then warm the cache with the new binding.
    pub async fn create(
        &self,
        account_id: AccountId,
        tag: IdentityTag,
    ) -> StoreResult<CreateOutcome> {
        let outcome = self.store.create_if_absent(account_id, tag).await?;
        if let CreateOutcome::Created(binding) = &outcome {
            self.cache.insert(account_id, Some(binding.clone()))?;
        }
        Ok(outcome)
    }

    /// Replace a tag in the store, then refresh the cache entry.
    pub async fn update_tag(
        &self,
        account_id: AccountId,
        new_tag: IdentityTag,
    ) -> StoreResult<UpdateOutcome> {
        let outcome = self.store.update_tag(account_id, new_tag).await?;
        if let UpdateOutcome::Updated(binding) = &outcome {
            self.cache.insert(account_id, Some(binding.clone()))?;
        }
        Ok(outcome)
    }

    /// Delete from the store, then drop the cache entry immediately.
    pub async fn delete(&self, account_id: AccountId) -> StoreResult<DeleteOutcome> {
        let outcome = self.store.delete(account_id).await?;
        if matches!(outcome, DeleteOutcome::Deleted) {
            self.cache.invalidate(account_id)?;
        }
        Ok(outcome)
    }

    /// Authoritative uniqueness probe; never answered from cache.
    pub async fn tag_exists(&self, tag: &IdentityTag) -> StoreResult<bool> {
        self.store.exists_by_tag(tag).await
    }

    /// Reverse lookup; admin path, uncached.
    pub async fn find_by_tag(&self, tag: &IdentityTag) -> StoreResult<Option<IdentityBinding>> {
        self.store.get_by_tag(tag).await
    }

    /// Admin enumeration ordered newest-first; uncached.
    pub async fn list(
        &self,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<IdentityBinding>> {
        self.store.list_ordered_by_creation(limit, offset).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBindingStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Memory store that counts how often the cache reaches it.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryBindingStore,
        account_gets: AtomicUsize,
        tag_probes: AtomicUsize,
    }

    #[async_trait]
    impl BindingStore for CountingStore {
        async fn create_if_absent(
            &self,
            account_id: AccountId,
            tag: IdentityTag,
        ) -> StoreResult<CreateOutcome> {
            self.inner.create_if_absent(account_id, tag).await
        }

        async fn update_tag(
            &self,
            account_id: AccountId,
            new_tag: IdentityTag,
        ) -> StoreResult<UpdateOutcome> {
            self.inner.update_tag(account_id, new_tag).await
        }

        async fn delete(&self, account_id: AccountId) -> StoreResult<DeleteOutcome> {
            self.inner.delete(account_id).await
        }

        async fn get_by_account(
            &self,
            account_id: AccountId,
        ) -> StoreResult<Option<IdentityBinding>> {
            self.account_gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_account(account_id).await
        }

        async fn get_by_tag(&self, tag: &IdentityTag) -> StoreResult<Option<IdentityBinding>> {
            self.inner.get_by_tag(tag).await
        }

        async fn exists_by_tag(&self, tag: &IdentityTag) -> StoreResult<bool> {
            self.tag_probes.fetch_add(1, Ordering::SeqCst);
            self.inner.exists_by_tag(tag).await
        }

        async fn list_ordered_by_creation(
            &self,
            limit: usize,
            offset: usize,
        ) -> StoreResult<Vec<IdentityBinding>> {
            self.inner.list_ordered_by_creation(limit, offset).await
        }
    }

    fn tag(s: &str) -> IdentityTag {
        IdentityTag::parse(s).unwrap()
    }

    fn cached(config: CacheConfig) -> (Arc<CountingStore>, CachedStore<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (Arc::clone(&store), CachedStore::new(store, config))
    }

    #[tokio::test]
    async fn test_read_through_fetches_once() {
        let (store, cached) = cached(CacheConfig::default());
        store
            .create_if_absent(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();

        let first = cached.get(AccountId::new(1)).await.unwrap();
        let second = cached.get(AccountId::new(1)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_marker_suppresses_repeat_lookups() {
        let (store, cached) = cached(CacheConfig::default());

        assert!(cached.get(AccountId::new(9)).await.unwrap().is_none());
        assert!(cached.get(AccountId::new(9)).await.unwrap().is_none());
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched_with_same_value() {
        let (store, cached) = cached(CacheConfig::new().with_ttl(Duration::from_millis(20)));
        store
            .create_if_absent(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();

        let first = cached.get(AccountId::new(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = cached.get(AccountId::new(1)).await.unwrap();

        // Correctness across the TTL boundary: same binding, two fetches.
        assert_eq!(first, second);
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_warms_cache() {
        let (store, cached) = cached(CacheConfig::default());
        let outcome = cached
            .create(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));

        let binding = cached.get(AccountId::new(1)).await.unwrap().unwrap();
        assert_eq!(binding.tag, tag("RC463713"));
        // The write itself warmed the cache; no read hit the store.
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_refreshes_cache_entry() {
        let (store, cached) = cached(CacheConfig::default());
        cached
            .create(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();
        let outcome = cached
            .update_tag(AccountId::new(1), tag("AB123456"))
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Updated(_)));

        let binding = cached.get(AccountId::new(1)).await.unwrap().unwrap();
        assert_eq!(binding.tag, tag("AB123456"));
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_invalidates_immediately() {
        let (store, cached) = cached(CacheConfig::default());
        cached
            .create(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();

        assert_eq!(
            cached.delete(AccountId::new(1)).await.unwrap(),
            DeleteOutcome::Deleted
        );
        // The cached binding must not survive the delete, TTL or not.
        assert!(cached.get(AccountId::new(1)).await.unwrap().is_none());
        assert_eq!(store.account_gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tag_exists_bypasses_cache() {
        let (store, cached) = cached(CacheConfig::default());
        cached
            .create(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();

        assert!(cached.tag_exists(&tag("RC463713")).await.unwrap());
        assert!(cached.tag_exists(&tag("RC463713")).await.unwrap());
        // Every probe reached the store's own constraint check.
        assert_eq!(store.tag_probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_cache_cold() {
        let (store, cached) = cached(CacheConfig::default());
        store
            .create_if_absent(AccountId::new(1), tag("RC463713"))
            .await
            .unwrap();

        let outcome = cached
            .create(AccountId::new(2), tag("RC463713"))
            .await
            .unwrap();
        assert_eq!(outcome, CreateOutcome::TagTaken);

        // The losing account was never cached with a phantom binding.
        assert!(cached.get(AccountId::new(2)).await.unwrap().is_none());
    }
}
