//! The persistent binding-store contract.

use async_trait::async_trait;
use tagguard_core::{AccountId, IdentityBinding, IdentityTag, StoreResult};

/// Outcome of an atomic create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The binding was created and is durable.
    Created(IdentityBinding),
    /// The account already holds a binding.
    AccountExists,
    /// The tag is bound to some other account.
    TagTaken,
}

/// Outcome of a tag replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The tag was replaced; `updated_at` is bumped.
    Updated(IdentityBinding),
    /// The account holds no binding.
    NotFound,
    /// The new tag is bound to some other account.
    TagTaken,
}

/// Outcome of a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Persistent key-value contract for identity bindings.
///
/// Implementations MUST enforce both uniqueness constraints themselves:
/// one binding per account and global uniqueness of tag values. Multiple
/// process instances may share one store, so application-level locking
/// cannot substitute for a store-side constraint. `create_if_absent` and
/// `update_tag` are atomic with respect to those constraints: of two
/// concurrent writes targeting the same tag, exactly one succeeds.
///
/// Infrastructure failures surface as `StoreError::Unavailable`; conflict
/// and not-found cases are ordinary outcomes, not errors.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Create a binding unless the account or the tag is already bound.
    async fn create_if_absent(
        &self,
        account_id: AccountId,
        tag: IdentityTag,
    ) -> StoreResult<CreateOutcome>;

    /// Replace the tag on an existing binding.
    ///
    /// Setting an account's current tag again succeeds (the row is its
    /// own owner) and still bumps `updated_at`.
    async fn update_tag(
        &self,
        account_id: AccountId,
        new_tag: IdentityTag,
    ) -> StoreResult<UpdateOutcome>;

    /// Remove an account's binding.
    async fn delete(&self, account_id: AccountId) -> StoreResult<DeleteOutcome>;

    /// Fetch the binding for an account.
    async fn get_by_account(&self, account_id: AccountId)
        -> StoreResult<Option<IdentityBinding>>;

    /// Reverse lookup: the binding holding a tag, if any.
    async fn get_by_tag(&self, tag: &IdentityTag) -> StoreResult<Option<IdentityBinding>>;

    /// Authoritative tag-uniqueness probe.
    async fn exists_by_tag(&self, tag: &IdentityTag) -> StoreResult<bool>;

    /// Bindings ordered by `created_at` descending, newest first.
    async fn list_ordered_by_creation(
        &self,
        limit: usize,
        offset: usize,
    ) -> StoreResult<Vec<IdentityBinding>>;
}
