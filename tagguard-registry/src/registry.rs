//! The authoritative account-to-tag registry.

use std::sync::Arc;

use tagguard_core::{
    AccountId, IdentityBinding, IdentityTag, RegistryError, RegistryResult,
};
use tagguard_storage::{
    BindingStore, CacheConfig, CacheStats, CachedStore, CreateOutcome, DeleteOutcome,
    UpdateOutcome,
};
use tracing::{info, warn};

/// Owns the account-to-tag mapping and enforces global tag uniqueness.
///
/// Constructed once per process and shared by handle; tests inject a
/// short-TTL cache config and an in-memory store. All writes are durable
/// in the store before the cache is touched, and the store's own
/// uniqueness constraint is what makes two concurrent registrations for
/// one tag resolve to exactly one winner.
pub struct IdentityRegistry<S: BindingStore> {
    store: CachedStore<S>,
}

impl<S: BindingStore> IdentityRegistry<S> {
    pub fn new(store: Arc<S>, cache_config: CacheConfig) -> Self {
        Self {
            store: CachedStore::new(store, cache_config),
        }
    }

    /// Normalize a raw candidate the way the registration entry point
    /// accepts it: surrounding whitespace dropped, ASCII-uppercased.
    /// The scanner-side entry point applies the same fold, so detection
    /// and registration always agree on case.
    fn normalize(raw: &str) -> String {
        raw.trim().to_ascii_uppercase()
    }

    /// Register a new account with a raw candidate tag.
    ///
    /// Fails with `FormatInvalid` before the store is ever consulted,
    /// `AlreadyRegistered` if the account holds a binding, and `TagTaken`
    /// if another account holds the tag.
    pub async fn register(
        &self,
        account_id: AccountId,
        raw_tag: &str,
    ) -> RegistryResult<IdentityBinding> {
        let tag = IdentityTag::parse(&Self::normalize(raw_tag))?;
        match self.store.create(account_id, tag.clone()).await? {
            CreateOutcome::Created(binding) => {
                info!(%account_id, tag = %binding.tag, "registered identity tag");
                Ok(binding)
            }
            CreateOutcome::AccountExists => {
                warn!(%account_id, "registration rejected: account already bound");
                Err(RegistryError::AlreadyRegistered { account_id })
            }
            CreateOutcome::TagTaken => {
                warn!(%account_id, %tag, "registration rejected: tag already bound");
                Err(RegistryError::TagTaken { tag })
            }
        }
    }

    /// Replace an account's tag with a new raw candidate.
    ///
    /// The account's own current tag is excluded from the collision
    /// check, so re-submitting it succeeds and bumps `updated_at`.
    pub async fn change_tag(
        &self,
        account_id: AccountId,
        raw_tag: &str,
    ) -> RegistryResult<IdentityBinding> {
        let tag = IdentityTag::parse(&Self::normalize(raw_tag))?;
        match self.store.update_tag(account_id, tag.clone()).await? {
            UpdateOutcome::Updated(binding) => {
                info!(%account_id, tag = %binding.tag, "identity tag changed");
                Ok(binding)
            }
            UpdateOutcome::NotFound => Err(RegistryError::NotRegistered { account_id }),
            UpdateOutcome::TagTaken => {
                warn!(%account_id, %tag, "tag change rejected: tag already bound");
                Err(RegistryError::TagTaken { tag })
            }
        }
    }

    /// Look up an account's binding through the read-through cache.
    pub async fn lookup(&self, account_id: AccountId) -> RegistryResult<Option<IdentityBinding>> {
        Ok(self.store.get(account_id).await?)
    }

    /// Reverse lookup: which account holds this tag. Admin path.
    pub async fn find_by_tag(
        &self,
        tag: &IdentityTag,
    ) -> RegistryResult<Option<IdentityBinding>> {
        Ok(self.store.find_by_tag(tag).await?)
    }

    /// Authoritative tag-existence probe; always bypasses the cache.
    pub async fn tag_exists(&self, tag: &IdentityTag) -> RegistryResult<bool> {
        Ok(self.store.tag_exists(tag).await?)
    }

    /// Remove an account's binding and drop its cache entry.
    pub async fn delete(&self, account_id: AccountId) -> RegistryResult<()> {
        match self.store.delete(account_id).await? {
            DeleteOutcome::Deleted => {
                info!(%account_id, "identity binding deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(RegistryError::NotRegistered { account_id }),
        }
    }

    /// Paginated admin enumeration, newest binding first. Uncached.
    pub async fn list_all(
        &self,
        page_size: usize,
        offset: usize,
    ) -> RegistryResult<Vec<IdentityBinding>> {
        Ok(self.store.list(page_size, offset).await?)
    }

    /// Snapshot of the lookup-cache counters.
    pub fn cache_stats(&self) -> RegistryResult<CacheStats> {
        Ok(self.store.cache_stats()?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
