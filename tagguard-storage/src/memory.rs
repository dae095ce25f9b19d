//! In-memory reference store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tagguard_core::{AccountId, IdentityBinding, IdentityTag, StoreError, StoreResult};

use crate::store::{BindingStore, CreateOutcome, DeleteOutcome, UpdateOutcome};

#[derive(Default)]
struct Maps {
    by_account: HashMap<AccountId, IdentityBinding>,
    by_tag: HashMap<IdentityTag, AccountId>,
}

/// Reference implementation backed by process memory.
///
/// One lock guards both maps, so check-then-create is atomic here the
/// same way the unique index makes it atomic in Postgres. Serves as the
/// test double and as the store for single-process deployments.
#[derive(Default)]
pub struct MemoryBindingStore {
    maps: RwLock<Maps>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bindings currently held.
    pub fn len(&self) -> usize {
        self.maps.read().map(|m| m.by_account.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BindingStore for MemoryBindingStore {
    async fn create_if_absent(
        &self,
        account_id: AccountId,
        tag: IdentityTag,
    ) -> StoreResult<CreateOutcome> {
        let mut maps = self.maps.write().map_err(|_| StoreError::LockPoisoned)?;
        if maps.by_account.contains_key(&account_id) {
            return Ok(CreateOutcome::AccountExists);
        }
        if maps.by_tag.contains_key(&tag) {
            return Ok(CreateOutcome::TagTaken);
        }
        let binding = IdentityBinding::new(account_id, tag.clone());
        maps.by_tag.insert(tag, account_id);
        maps.by_account.insert(account_id, binding.clone());
        Ok(CreateOutcome::Created(binding))
    }

    async fn update_tag(
        &self,
        account_id: AccountId,
        new_tag: IdentityTag,
    ) -> StoreResult<UpdateOutcome> {
        let mut maps = self.maps.write().map_err(|_| StoreError::LockPoisoned)?;
        let Maps { by_account, by_tag } = &mut *maps;

        let Some(binding) = by_account.get_mut(&account_id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        if let Some(owner) = by_tag.get(&new_tag) {
            if *owner != account_id {
                return Ok(UpdateOutcome::TagTaken);
            }
        }
        by_tag.remove(&binding.tag);
        by_tag.insert(new_tag.clone(), account_id);
        binding.tag = new_tag;
        binding.updated_at = Utc::now();
        Ok(UpdateOutcome::Updated(binding.clone()))
    }

    async fn delete(&self, account_id: AccountId) -> StoreResult<DeleteOutcome> {
        let mut maps = self.maps.write().map_err(|_| StoreError::LockPoisoned)?;
        match maps.by_account.remove(&account_id) {
            Some(binding) => {
                maps.by_tag.remove(&binding.tag);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn get_by_account(
        &self,
        account_id: AccountId,
    ) -> StoreResult<Option<IdentityBinding>> {
        let maps = self.maps.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(maps.by_account.get(&account_id).cloned())
    }

    async fn get_by_tag(&self, tag: &IdentityTag) -> StoreResult<Option<IdentityBinding>> {
        let maps = self.maps.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(maps
            .by_tag
            .get(tag)
            .and_then(|account_id| maps.by_account.get(account_id))
            .cloned())
    }

    async fn exists_by_tag(&self, tag: &IdentityTag) -> StoreResult<bool> {
        let maps = self.maps.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(maps.by_tag.contains_key(tag))
    }

    async fn list_ordered_by_creation(
        &self,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<IdentityBinding>> {
        let maps = self.maps.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut bindings: Vec<IdentityBinding> = maps.by_account.values().cloned().collect();
        bindings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.account_id.cmp(&a.account_id))
        });
        Ok(bindings.into_iter().skip(offset).take(limit).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
